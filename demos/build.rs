fn main() {
    let result = lazyprop_build::Builder::new()
        .marker_module("crate::markers")
        .file("partial/person.rs")
        .file("partial/calc.rs")
        .file("partial/report.rs")
        .file("partial/flaky.rs")
        .file_in("partial/generic.rs", "crate::wrapper")
        .generate();

    if let Err(err) = result {
        panic!("failed to generate properties: {err}");
    }
}
