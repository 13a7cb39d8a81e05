use crate::config::Config;
use crate::models::PageId;

pub fn render_index(config: &Config, page: PageId) -> String {
    let name = config.display_name.as_deref().unwrap_or("");
    INDEX_HTML
        .replace("{{NAME}}", &escape_html(name))
        .replace("{{NAME_DISPLAY}}", if name.is_empty() { "none" } else { "block" })
        .replace("{{VIDEO_ID}}", &escape_html(&config.video_id))
        .replace(
            "{{AUTO_LOCATION}}",
            if config.auto_detect_location { "true" } else { "false" },
        )
        .replace("{{PAGE_ID}}", &page.to_string())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Sleep Projector</title>
  <style>
    :root {
      --ink: #e8e6f0;
      --muted: #8d8aa3;
      --good: #5fd38d;
      --medium: #f4c95d;
      --low: #ef6461;
      --strain: #63a4ff;
    }

    * {
      box-sizing: border-box;
    }

    html,
    body {
      margin: 0;
      height: 100%;
      background: #000;
      color: var(--ink);
      font-family: "Helvetica Neue", "Segoe UI", sans-serif;
      overflow: hidden;
    }

    .video {
      position: fixed;
      inset: 0;
      pointer-events: none;
      opacity: 0.55;
    }

    .video iframe {
      width: 100%;
      height: 100%;
      border: 0;
    }

    .display {
      position: relative;
      z-index: 1;
      height: 100%;
      display: grid;
      place-items: center;
      align-content: center;
      gap: 18px;
      text-align: center;
    }

    .name-section {
      display: {{NAME_DISPLAY}};
      letter-spacing: 0.3em;
      text-transform: uppercase;
      color: var(--muted);
    }

    .time {
      font-size: clamp(4rem, 14vw, 10rem);
      font-weight: 200;
      margin: 0;
    }

    .date,
    .sunrise {
      margin: 0;
      color: var(--muted);
      font-size: 1.3rem;
    }

    .wake {
      font-size: 2rem;
      min-height: 2.4rem;
    }

    .metrics {
      display: flex;
      gap: 48px;
      margin-top: 24px;
    }

    .metric .value {
      font-size: 2.6rem;
      font-weight: 300;
    }

    .metric .label {
      font-size: 0.8rem;
      letter-spacing: 0.2em;
      text-transform: uppercase;
      color: var(--muted);
    }

    #recoveryScore .value {
      color: var(--good);
    }

    #recoveryScore.medium .value {
      color: var(--medium);
    }

    #recoveryScore.low .value {
      color: var(--low);
    }

    #strainScore .value {
      color: var(--strain);
    }

    #strainScore.high .value {
      color: var(--low);
    }

    .overlay {
      position: fixed;
      inset: 0;
      z-index: 2;
      display: grid;
      place-items: center;
      background: rgba(0, 0, 0, 0.6);
      cursor: pointer;
      font-size: 1.4rem;
      letter-spacing: 0.1em;
    }

    .overlay.hidden {
      display: none;
    }
  </style>
</head>
<body>
  <div class="video">
    <iframe
      id="youtubePlayer"
      src="https://www.youtube-nocookie.com/embed/{{VIDEO_ID}}?autoplay=1&mute=1&controls=0&loop=1&playlist={{VIDEO_ID}}&modestbranding=1&rel=0&disablekb=1&fs=0&iv_load_policy=3&enablejsapi=1"
      allow="autoplay; fullscreen"
    ></iframe>
  </div>

  <main class="display">
    <div class="name-section"><span class="name">{{NAME}}</span></div>
    <p class="time" id="currentTime">--</p>
    <p class="date" id="currentDate"></p>
    <p class="sunrise" id="sunriseInfo"></p>
    <div class="wake" id="wakePhrase"></div>
    <section class="metrics">
      <div class="metric" id="recoveryScore">
        <div class="value" id="recoveryValue">--</div>
        <div class="label">Recovery</div>
      </div>
      <div class="metric" id="sleepScore">
        <div class="value" id="sleepValue">--</div>
        <div class="label">Sleep</div>
      </div>
      <div class="metric" id="strainScore">
        <div class="value" id="strainValue">--</div>
        <div class="label">Strain</div>
      </div>
    </section>
  </main>

  <div class="overlay" id="soundOverlay">Tap to enable sound</div>

  <script>
    const autoDetectLocation = {{AUTO_LOCATION}};
    const pageId = {{PAGE_ID}};
    const byId = (id) => document.getElementById(id);
    const overlay = byId('soundOverlay');
    const forPage = (path) => `${path}?page=${pageId}`;
    let player = null;

    const post = (path, body) =>
      fetch(path, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body)
      });

    const setBand = (el, classes, active) => {
      el.classList.remove(...classes);
      if (active) {
        el.classList.add(active);
      }
    };

    const render = (state) => {
      byId('currentTime').textContent = state.clock.time;
      byId('currentDate').textContent = state.clock.date;
      byId('sunriseInfo').textContent = state.clock.sunrise;
      byId('wakePhrase').textContent = state.wake_phrase || '';

      byId('recoveryValue').textContent = state.metrics.recovery.value;
      const band = state.metrics.recovery.band;
      setBand(byId('recoveryScore'), ['low', 'medium'], band === 'high' ? null : band);
      byId('sleepValue').textContent = state.metrics.sleep.value;
      byId('strainValue').textContent = state.metrics.strain.value;
      setBand(byId('strainScore'), ['high'], state.metrics.strain.band);

      if (overlay) {
        overlay.classList.toggle('hidden', !state.overlay_visible);
      }
    };

    const requestFullscreen = () => {
      const elem = document.documentElement;
      const request =
        elem.requestFullscreen ||
        elem.webkitRequestFullscreen ||
        elem.mozRequestFullScreen ||
        elem.msRequestFullscreen;
      if (request) {
        Promise.resolve(request.call(elem)).catch(() => {});
      }
    };

    const execute = (command) => {
      switch (command.command) {
        case 'hide_overlay':
          if (overlay) overlay.classList.add('hidden');
          break;
        case 'request_fullscreen':
          requestFullscreen();
          break;
        case 'unmute':
          if (player) player.unMute();
          break;
        case 'set_volume':
          if (player) player.setVolume(command.volume);
          break;
      }
    };

    const drainCommands = async () => {
      const res = await fetch(forPage('/api/player/commands'));
      if (res.ok) {
        (await res.json()).forEach(execute);
      }
    };

    const refreshDisplay = async () => {
      const res = await fetch('/api/display');
      if (res.ok) {
        render(await res.json());
      }
    };

    if (overlay) {
      overlay.addEventListener('click', () => {
        post(forPage('/api/gesture'))
          .then(() => new Promise((resolve) => setTimeout(resolve, 50)))
          .then(drainCommands)
          .catch(() => {});
      });
    } else {
      console.warn('sound overlay missing, sound unlock disabled');
    }

    window.onYouTubeIframeAPIReady = () => {
      player = new YT.Player('youtubePlayer', {
        events: {
          onReady: () => post(forPage('/api/player/ready')).catch(() => {}),
          onStateChange: (event) =>
            post(forPage('/api/player/state'), { state: event.data }).catch(() => {})
        }
      });
    };

    const tag = document.createElement('script');
    tag.src = 'https://www.youtube.com/iframe_api';
    document.head.appendChild(tag);

    if (autoDetectLocation && navigator.geolocation) {
      navigator.geolocation.getCurrentPosition(
        (pos) => post('/api/location', { latitude: pos.coords.latitude, longitude: pos.coords.longitude }),
        (err) => post('/api/location', { error: err.message })
      );
    }

    refreshDisplay().catch(() => {});
    setInterval(() => refreshDisplay().catch(() => {}), 1000);
    setInterval(() => drainCommands().catch(() => {}), 500);
  </script>
</body>
</html>
"#;
