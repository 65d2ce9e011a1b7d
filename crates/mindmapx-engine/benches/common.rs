// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_outline(sections: usize, items_per_section: usize) -> String {
    let mut content = String::new();
    for section in 0..sections {
        content.push_str(&format!("## Section **{section}**\n\n"));
        for item in 0..items_per_section {
            let indent = "  ".repeat(item % 3);
            content.push_str(&format!(
                "{indent}- item {section}.{item} with [a link](https://example.com/{item}) and `code`\n"
            ));
        }
        content.push('\n');
    }
    content
}
