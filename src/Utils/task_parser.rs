/// parse task document with structure like
/// ```text
/// ode
///   equation: y'' = 1 + 2*x*y - x^2*y'
///   order: 2
/// solver
///   x0: 0.0
///   x_end: 1.0
///   h: 0.1
///   y0: 1.0, 0.0
/// output
///   loglevel: info
/// ```
/// which has titles and key-value pairs. A value is the rest of its line, so equations may contain
/// spaces and commas. Lines starting with //, #, % or ; are comments.
use crate::errors::OdeError;
use log::warn;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, line_ending, not_line_ending, space0},
    combinator::{all_consuming, eof, recognize},
    multi::{many0, many1},
    sequence::{delimited, pair, preceded, separated_pair, terminated},
};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

pub type SectionMap = HashMap<String, String>;
pub type DocumentMap = HashMap<String, SectionMap>;

const KNOWN_SECTIONS: [&str; 3] = ["ode", "solver", "output"];

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn end_of_line(input: &str) -> IResult<&str, &str> {
    alt((line_ending, eof)).parse(input)
}

/// a title is a lonely word on its own line
fn parse_title(input: &str) -> IResult<&str, String> {
    let (input, title) =
        terminated(preceded(space0, parse_identifier), pair(space0, end_of_line)).parse(input)?;
    Ok((input, title.to_string()))
}

/// `key: value till the end of the line`
fn parse_key_value_pair(input: &str) -> IResult<&str, (String, String)> {
    let colon_separator = delimited(space0, char(':'), space0);
    let (input, (key, value)) = terminated(
        separated_pair(preceded(space0, parse_identifier), colon_separator, not_line_ending),
        end_of_line,
    )
    .parse(input)?;
    Ok((input, (key.to_string(), value.trim().to_string())))
}

fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, title) = parse_title(input)?;
    let (input, pairs) = many0(parse_key_value_pair).parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// Filters out comment lines (starting with //, #, %, or ;) and empty lines
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the entire document into a HashMap title -> (key -> value)
pub fn parse_document(input: &str) -> Result<DocumentMap, OdeError> {
    let filtered = filter_comments(input);
    match all_consuming(many1(parse_section)).parse(filtered.as_str()) {
        Ok((_, sections)) => {
            let mut document = DocumentMap::new();
            for (title, section) in sections {
                if document.insert(title.clone(), section).is_some() {
                    return Err(OdeError::Parse(format!("section {} appears twice", title)));
                }
            }
            Ok(document)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let line = e.input.lines().next().unwrap_or("").trim();
            Err(OdeError::Parse(format!(
                "task document is malformed near '{}'",
                line
            )))
        }
        Err(nom::Err::Incomplete(_)) => {
            Err(OdeError::Parse("task document is incomplete".to_string()))
        }
    }
}

/// everything needed to solve one problem and handle its result
#[derive(Clone, Debug, PartialEq)]
pub struct IVPTask {
    pub equation: String,
    pub order: usize,
    pub function: String,
    pub arg: String,
    pub x0: f64,
    pub x_end: f64,
    pub h: f64,
    pub y0: Vec<f64>,
    pub loglevel: Option<String>,
    pub log_file: Option<String>,
    pub save_csv: Option<String>,
    pub plot: bool,
}

fn section<'a>(document: &'a DocumentMap, title: &str) -> Result<&'a SectionMap, OdeError> {
    document
        .get(title)
        .ok_or_else(|| OdeError::Parse(format!("section {} is missing", title)))
}

fn required<'a>(section: &'a SectionMap, title: &str, key: &str) -> Result<&'a str, OdeError> {
    section
        .get(key)
        .map(|s| s.as_str())
        .ok_or_else(|| OdeError::Parse(format!("key {} is missing in section {}", key, title)))
}

fn parse_number<T: FromStr>(value: &str, key: &str) -> Result<T, OdeError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| OdeError::Parse(format!("{}: cannot read a number from '{}'", key, value)))
}

fn parse_number_list(value: &str, key: &str) -> Result<Vec<f64>, OdeError> {
    value
        .split(',')
        .map(|item| parse_number::<f64>(item, key))
        .collect()
}

impl IVPTask {
    pub fn from_document(document: &DocumentMap) -> Result<IVPTask, OdeError> {
        for title in document.keys() {
            if !KNOWN_SECTIONS.contains(&title.as_str()) {
                warn!("section {} of the task document is ignored", title);
            }
        }
        let ode = section(document, "ode")?;
        let solver = section(document, "solver")?;
        let empty = SectionMap::new();
        let output = document.get("output").unwrap_or(&empty);

        let plot = match output.get("plot").map(|s| s.as_str()) {
            None => false,
            Some(flag) => flag
                .parse::<bool>()
                .map_err(|_| OdeError::Parse(format!("plot: expected true or false, got '{}'", flag)))?,
        };
        Ok(IVPTask {
            equation: required(ode, "ode", "equation")?.to_string(),
            order: parse_number(required(ode, "ode", "order")?, "order")?,
            function: ode.get("function").cloned().unwrap_or_else(|| "y".to_string()),
            arg: ode.get("arg").cloned().unwrap_or_else(|| "x".to_string()),
            x0: parse_number(required(solver, "solver", "x0")?, "x0")?,
            x_end: parse_number(required(solver, "solver", "x_end")?, "x_end")?,
            h: parse_number(required(solver, "solver", "h")?, "h")?,
            y0: parse_number_list(required(solver, "solver", "y0")?, "y0")?,
            loglevel: output.get("loglevel").cloned(),
            log_file: output.get("log_file").cloned(),
            save_csv: output.get("save_csv").cloned(),
            plot,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<IVPTask, OdeError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }
}

impl FromStr for IVPTask {
    type Err = OdeError;

    fn from_str(input: &str) -> Result<IVPTask, OdeError> {
        IVPTask::from_document(&parse_document(input)?)
    }
}
