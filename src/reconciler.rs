use crate::models::{
    MetricBundle, MetricPayload, MetricsDisplay, PLACEHOLDER, RecoveryBand, RecoveryDisplay,
    SleepDisplay, StrainBand, StrainDisplay,
};

const RECOVERY_LOW_BELOW: i64 = 33;
const RECOVERY_MEDIUM_BELOW: i64 = 67;
const STRAIN_HIGH_FROM: f64 = 18.0;

pub fn reconcile(bundle: &MetricBundle) -> MetricsDisplay {
    MetricsDisplay {
        recovery: reconcile_recovery(bundle.recovery.as_ref()),
        sleep: reconcile_sleep(bundle.sleep.as_ref()),
        strain: reconcile_strain(bundle.cycle.as_ref(), bundle.workout.as_ref()),
    }
}

pub fn reconcile_recovery(payload: Option<&MetricPayload>) -> RecoveryDisplay {
    let Some(score) = payload.and_then(MetricPayload::recovery_score).and_then(round_score) else {
        return RecoveryDisplay::default();
    };

    RecoveryDisplay {
        value: score.to_string(),
        band: Some(recovery_band(score)),
    }
}

pub fn reconcile_sleep(payload: Option<&MetricPayload>) -> SleepDisplay {
    match payload.and_then(MetricPayload::sleep_performance).and_then(round_score) {
        Some(score) => SleepDisplay {
            value: score.to_string(),
        },
        None => SleepDisplay::default(),
    }
}

/// Cycle strain wins over workout strain. A strain of zero counts as no data
/// for that source.
pub fn reconcile_strain(
    cycle: Option<&MetricPayload>,
    workout: Option<&MetricPayload>,
) -> StrainDisplay {
    let strain = positive_strain(cycle).or_else(|| positive_strain(workout));

    match strain {
        Some(value) => StrainDisplay {
            value: format!("{value:.1}"),
            band: (value >= STRAIN_HIGH_FROM).then_some(StrainBand::High),
        },
        None => StrainDisplay {
            value: PLACEHOLDER.to_string(),
            band: None,
        },
    }
}

pub fn recovery_band(score: i64) -> RecoveryBand {
    if score < RECOVERY_LOW_BELOW {
        RecoveryBand::Low
    } else if score < RECOVERY_MEDIUM_BELOW {
        RecoveryBand::Medium
    } else {
        RecoveryBand::High
    }
}

fn positive_strain(payload: Option<&MetricPayload>) -> Option<f64> {
    payload
        .and_then(MetricPayload::strain)
        .filter(|value| value.is_finite() && *value > 0.0)
}

fn round_score(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.round() as i64)
}
