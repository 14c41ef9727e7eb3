use delay_server::{cli, ServerVariant};

fn main() -> std::process::ExitCode {
    cli::main_with(ServerVariant::Random)
}
