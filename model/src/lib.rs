/*!

This library provides the building blocks of the `meshtest` end-to-end suite: the environment
configuration, a REST client for the Kiali API, helpers for the service graph, a wrapper for the
`oc` command line tool and a bounded poller for awaiting eventually consistent cluster state.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use clients::{ApiMethod, ApiResponse, KialiApi, KialiClient};
pub use configuration::EnvironmentConfig;
pub use error::{Error, Result};
pub use graph::{Badge, BadgeCondition, GraphParams, GraphType};
pub use oc::Oc;
pub use poll::{await_condition, PollError, Poller};

pub mod clients;
pub mod cluster_role;
mod configuration;
pub mod constants;
mod error;
pub mod graph;
pub mod oc;
pub mod poll;
