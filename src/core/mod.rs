// ─── AppLauncher Core ───
// Native bootstrap for packaged Java applications.
//
// Architecture:
//   core/
//     launch/    - Argument parsing + launch sequencer
//     cache/     - AppCDS cache states and their side effects
//     instance/  - Single instance detection and hand-off
//     package/   - Package configuration (app/<name>.json)
//     platform/  - OS services behind the Platform trait
//     vm/        - JVM command line + process runner
//     messages   - Localized user-facing messages

pub mod cache;
pub mod error;
pub mod instance;
pub mod launch;
pub mod messages;
pub mod package;
pub mod platform;
pub mod vm;

#[cfg(test)]
pub mod testing;
