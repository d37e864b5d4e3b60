fn main() {
    if let Err(e) = studyplan_lib::run() {
        tracing::error!(error = %e, "studyplan failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
