/*!

Provides utilities for running the `meshtest` end-to-end suite against a live cluster running
Istio, Kiali and the bookinfo application.

A [`Session`] reads the environment file, talks to Kiali and applies the Istio manifests bundled
in `assets/` with `oc`. Manifests applied through a session are deleted when it goes out of scope.

!*/

pub mod session;
mod test_settings;

pub use session::Session;
