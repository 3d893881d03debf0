fn main() {
    if let Err(err) = pert_chart::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
