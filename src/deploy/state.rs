// ABOUTME: Pipeline state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce that phases run in their fixed order.

/// Initial state: record created, nothing checked yet.
/// Available actions: `pre_health_check()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// The live environment passed its health check.
/// Available actions: `deploy_target()`
#[derive(Debug, Clone, Copy, Default)]
pub struct PreChecked;

/// The new version was released to the inactive environment.
/// Available actions: `warmup_verification()`
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetDeployed;

/// The inactive environment passed verification after warmup.
/// Available actions: `switch_traffic()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Verified;

/// Traffic points at the new environment and state is persisted.
/// Available actions: `post_verification()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Switched;

/// All five phases are logged.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Completed;
