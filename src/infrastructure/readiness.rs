//! Bounded database readiness poll.
//!
//! The primary endpoint is probed until it answers, `max_attempts` probes
//! have failed, or the optional deadline passes. An exhausted poll gets
//! exactly one probe against the fallback endpoint before readiness is
//! declared failed.

use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use super::backoff::Backoff;
use super::config::ReadinessConfig;
use crate::domain::Endpoint;
use crate::error::ReadinessError;
use crate::port::ConnectivityProbe;

/// States of the primary poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    /// About to make probe number `attempt` (1-based).
    Probing { attempt: u32 },
    /// The endpoint answered on probe `attempts`.
    Ready { endpoint: Endpoint, attempts: u32 },
    /// No answer after `attempts` probes.
    Exhausted { attempts: u32 },
}

impl ReadinessState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Probing { .. })
    }
}

/// Endpoint that ended up answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readiness {
    pub endpoint: Endpoint,
    /// Primary probes made, not counting the fallback probe.
    pub attempts: u32,
    pub via_fallback: bool,
}

/// Drives the poll against a [`ConnectivityProbe`].
pub struct ReadinessPoller<'a, P: ConnectivityProbe + ?Sized> {
    probe: &'a P,
    config: &'a ReadinessConfig,
}

impl<'a, P: ConnectivityProbe + ?Sized> ReadinessPoller<'a, P> {
    pub fn new(probe: &'a P, config: &'a ReadinessConfig) -> Self {
        Self { probe, config }
    }

    /// Poll `primary` until a terminal state is reached.
    pub async fn poll(&self, primary: &Endpoint) -> ReadinessState {
        let started = Instant::now();
        let deadline = self.config.deadline();
        let max_attempts = self.config.max_attempts.max(1);
        let mut backoff = Backoff::new(self.config.backoff.clone());
        let mut state = ReadinessState::Probing { attempt: 1 };

        while let ReadinessState::Probing { attempt } = state {
            info!(
                attempt,
                max_attempts,
                endpoint = %primary,
                "Waiting for database"
            );

            if self.probe.probe(primary, self.config.probe_timeout()).await {
                state = ReadinessState::Ready {
                    endpoint: primary.clone(),
                    attempts: attempt,
                };
                continue;
            }

            if attempt >= max_attempts {
                state = ReadinessState::Exhausted { attempts: attempt };
                continue;
            }

            let delay = backoff.next_delay();
            if let Some(deadline) = deadline {
                if started.elapsed() + delay >= deadline {
                    warn!(
                        attempt,
                        deadline_secs = deadline.as_secs(),
                        "Readiness deadline reached"
                    );
                    state = ReadinessState::Exhausted { attempts: attempt };
                    continue;
                }
            }

            sleep(delay).await;
            state = ReadinessState::Probing {
                attempt: attempt + 1,
            };
        }

        state
    }

    /// Poll `primary`, then try `fallback` once if the poll is exhausted.
    ///
    /// # Errors
    ///
    /// [`ReadinessError::Unreachable`] when neither endpoint answers.
    pub async fn wait(
        &self,
        primary: &Endpoint,
        fallback: &Endpoint,
    ) -> Result<Readiness, ReadinessError> {
        match self.poll(primary).await {
            ReadinessState::Ready { endpoint, attempts } => {
                info!(endpoint = %endpoint, attempts, "Database is ready");
                Ok(Readiness {
                    endpoint,
                    attempts,
                    via_fallback: false,
                })
            }
            ReadinessState::Exhausted { attempts } | ReadinessState::Probing { attempt: attempts } => {
                warn!(
                    primary = %primary,
                    fallback = %fallback,
                    attempts,
                    "Primary database endpoint exhausted, trying fallback"
                );
                if self.probe.probe(fallback, self.config.probe_timeout()).await {
                    info!(endpoint = %fallback, "Database is ready on fallback endpoint");
                    Ok(Readiness {
                        endpoint: fallback.clone(),
                        attempts,
                        via_fallback: true,
                    })
                } else {
                    Err(ReadinessError::Unreachable {
                        primary: primary.to_string(),
                        fallback: fallback.to_string(),
                        attempts,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{config, probe::ScriptedProbe};
    use std::time::Duration;

    fn primary() -> Endpoint {
        Endpoint::new("db", 5432)
    }

    fn fallback() -> Endpoint {
        Endpoint::new("127.0.0.1", 5432)
    }

    #[tokio::test]
    async fn ready_on_first_answer() {
        let probe = ScriptedProbe::new().answer(&primary(), [false, false, true]);
        let cfg = config::readiness(10);
        let state = ReadinessPoller::new(&probe, &cfg).poll(&primary()).await;
        assert_eq!(
            state,
            ReadinessState::Ready {
                endpoint: primary(),
                attempts: 3
            }
        );
        assert_eq!(probe.calls_to(&primary()), 3);
    }

    #[tokio::test]
    async fn exhaustion_makes_one_fallback_probe() {
        let probe = ScriptedProbe::new();
        let cfg = config::readiness(4);
        let err = ReadinessPoller::new(&probe, &cfg)
            .wait(&primary(), &fallback())
            .await
            .unwrap_err();

        assert_eq!(probe.calls_to(&primary()), 4);
        assert_eq!(probe.calls_to(&fallback()), 1);
        assert_eq!(
            err,
            ReadinessError::Unreachable {
                primary: "db:5432".into(),
                fallback: "127.0.0.1:5432".into(),
                attempts: 4,
            }
        );
    }

    #[tokio::test]
    async fn fallback_answer_is_ready() {
        let probe = ScriptedProbe::new().answer(&fallback(), [true]);
        let cfg = config::readiness(2);
        let ready = ReadinessPoller::new(&probe, &cfg)
            .wait(&primary(), &fallback())
            .await
            .unwrap();
        assert_eq!(ready.endpoint, fallback());
        assert!(ready.via_fallback);
        assert_eq!(ready.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_cuts_the_poll_short() {
        let probe = ScriptedProbe::new();
        let mut cfg = config::readiness(100);
        cfg.backoff.initial_delay_ms = 1_000;
        cfg.backoff.max_delay_ms = 1_000;
        cfg.deadline_secs = Some(3);

        let state = ReadinessPoller::new(&probe, &cfg).poll(&primary()).await;
        // probes at t=0s, 1s, 2s; the next sleep would reach the 3s deadline
        assert_eq!(state, ReadinessState::Exhausted { attempts: 3 });
        assert!(probe.calls_to(&primary()) < 100);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_with_backoff_between_probes() {
        let probe = ScriptedProbe::new().answer(&primary(), [false, false, true]);
        let mut cfg = config::readiness(5);
        cfg.backoff.initial_delay_ms = 100;
        cfg.backoff.max_delay_ms = 1_000;
        cfg.backoff.backoff_multiplier = 2.0;

        let started = Instant::now();
        ReadinessPoller::new(&probe, &cfg).poll(&primary()).await;
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }
}
