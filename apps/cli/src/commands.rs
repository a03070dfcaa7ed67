use sdk_util::xml::{escape, escape_with_patterns};
use sdk_util::{ReplacementSet, format_path, load_batch};
use std::io;
use std::path::Path;
use std::time::Instant;

pub fn escape_texts(texts: &[String], patterns: bool) -> Result<(), Box<dyn std::error::Error>> {
    let escaper: fn(&str) -> String = if patterns {
        escape_with_patterns
    } else {
        escape
    };

    if texts.is_empty() {
        let input = io::read_to_string(io::stdin())?;
        print!("{}", escaper(&input));
        return Ok(());
    }

    for text in texts {
        println!("{}", escaper(text));
    }

    Ok(())
}

fn parse_replacements(
    values: Option<&str>,
    named: Option<&str>,
) -> Result<ReplacementSet, Box<dyn std::error::Error>> {
    match (values, named) {
        (Some(values), _) => match ReplacementSet::from_json(values)? {
            set @ ReplacementSet::Positional(_) => Ok(set),
            ReplacementSet::Named(_) => Err("--values expects a JSON array".into()),
        },
        (None, Some(named)) => match ReplacementSet::from_json(named)? {
            set @ ReplacementSet::Named(_) => Ok(set),
            ReplacementSet::Positional(_) => Err("--named expects a JSON object".into()),
        },
        (None, None) => Ok(ReplacementSet::default()),
    }
}

pub fn format_template(
    template: &str,
    values: Option<&str>,
    named: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let replacements = parse_replacements(values, named)?;
    println!("{}", format_path(template, &replacements)?);
    Ok(())
}

pub fn render_batch(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let output = load_batch(file)?.render()?;

    for path in &output.paths {
        println!("{path}");
    }
    for text in &output.texts {
        println!("{text}");
    }

    eprintln!(
        "Rendered {} paths, {} texts from {} in {:.2?}",
        output.paths.len(),
        output.texts.len(),
        file.display(),
        start.elapsed()
    );

    Ok(())
}
