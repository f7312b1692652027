fn main() -> std::process::ExitCode {
    ngfield_lib::run()
}
