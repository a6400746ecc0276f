//! Flutter bridge for PlanIt.
//! Exposes the core task registry to Dart through `flutter_rust_bridge`.

pub mod api;
