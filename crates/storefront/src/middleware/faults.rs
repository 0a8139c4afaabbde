//! Diagnostic fault injection.
//!
//! When enabled, a random fraction of requests fails with a 500 before
//! reaching a handler, and every request can be delayed by a random
//! duration. Both are test aids for exercising client retries and loading
//! states.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use rand::Rng;

use crate::config::{DelayRange, FaultConfig};
use crate::error::AppError;
use crate::state::AppState;

/// Whether this request should be failed on purpose.
pub fn should_fail(faults: &FaultConfig, rng: &mut impl Rng) -> bool {
    faults.error && rng.random_bool(faults.error_rate.clamp(0.0, 1.0))
}

/// Pick a delay uniformly from the range.
pub fn pick_delay(range: DelayRange, rng: &mut impl Rng) -> Duration {
    let min = u64::try_from(range.min.as_millis()).unwrap_or(u64::MAX);
    let max = u64::try_from(range.max.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rng.random_range(min..=max))
}

/// Apply the configured faults, then hand the request on.
pub async fn fault_injection_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let faults = state.faults();
    if !faults.is_active() || request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    // ThreadRng is not Send; draw everything before the first await.
    let (fail, delay) = {
        let mut rng = rand::rng();
        (
            should_fail(faults, &mut rng),
            faults.delay.map(|range| pick_delay(range, &mut rng)),
        )
    };

    if let Some(delay) = delay {
        tracing::debug!(?delay, "Delaying request");
        tokio::time::sleep(delay).await;
    }

    if fail {
        tracing::warn!(
            method = %request.method(),
            path = request.uri().path(),
            "Injected fault"
        );
        return AppError::InjectedFault.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_disabled_never_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        let faults = FaultConfig {
            error_rate: 1.0,
            ..FaultConfig::default()
        };
        assert!((0..100).all(|_| !should_fail(&faults, &mut rng)));
    }

    #[test]
    fn test_rate_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let always = FaultConfig {
            error: true,
            error_rate: 1.0,
            delay: None,
        };
        let never = FaultConfig {
            error_rate: 0.0,
            ..always.clone()
        };
        assert!((0..100).all(|_| should_fail(&always, &mut rng)));
        assert!((0..100).all(|_| !should_fail(&never, &mut rng)));
    }

    #[test]
    fn test_default_rate_is_a_minority() {
        let mut rng = StdRng::seed_from_u64(42);
        let faults = FaultConfig {
            error: true,
            ..FaultConfig::default()
        };
        let failures = (0..1000).filter(|_| should_fail(&faults, &mut rng)).count();
        assert!((100..300).contains(&failures), "got {failures}");
    }

    #[test]
    fn test_pick_delay_within_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let range = DelayRange {
            min: Duration::from_millis(100),
            max: Duration::from_millis(3000),
        };
        for _ in 0..100 {
            let delay = pick_delay(range, &mut rng);
            assert!(delay >= range.min && delay <= range.max);
        }

        let fixed = DelayRange {
            min: Duration::from_millis(5),
            max: Duration::from_millis(5),
        };
        assert_eq!(pick_delay(fixed, &mut rng), Duration::from_millis(5));
    }
}
