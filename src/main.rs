fn main() -> std::process::ExitCode {
    applauncher_lib::run()
}
