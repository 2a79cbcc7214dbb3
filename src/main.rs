fn main() {
    if let Err(err) = lineage_renderer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
