use cmdshim_demo::{app_builder, DemoProvider};

fn main() {
    let app = match app_builder(DemoProvider::new()).build() {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    };
    std::process::exit(app.run());
}
