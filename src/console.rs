//! Parsing of the interactive console commands.
//!
//! Each line typed at the prompt maps onto at most one query intent, so
//! the coordinator sees the same discrete edits a graphical filter panel
//! would send.

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::query::{FilterField, SortOrder};

const DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month repr:numerical padding:zero]-[day padding:zero]");

/// One parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the search term. An empty term clears the search.
    Search(String),
    /// Toggle one value in one filter set.
    Toggle(FilterField, String),
    /// Replace the age bounds. `None` leaves a side unbounded.
    AgeRange(Option<u32>, Option<u32>),
    /// Replace the date bounds. `None` leaves a side unbounded.
    DateRange(Option<Date>, Option<Date>),
    /// Replace the sort order.
    Sort(SortOrder),
    /// Jump to the given page.
    Page(u64),
    /// Jump to the page after the current one, if any.
    NextPage,
    /// Jump to the page before the current one, if any.
    PreviousPage,
    /// Clear the search term, all filters and all bounds.
    ClearFilters,
    /// Print the filter panel.
    ShowOptions,
    /// Print the command reference.
    Help,
    /// Leave the dashboard.
    Quit,
}

/// The command reference printed by `help`.
pub fn help_text() -> &'static str {
    "Commands:\n\
     \x20 search <text>        search by customer name or phone number (empty clears)\n\
     \x20 region <name>        toggle a customer region filter\n\
     \x20 gender <name>        toggle a gender filter\n\
     \x20 category <name>      toggle a product category filter\n\
     \x20 tag <name>           toggle a product tag filter\n\
     \x20 pay <name>           toggle a payment method filter\n\
     \x20 age [min] [max]      set the age bounds, '-' leaves a side open\n\
     \x20 dates [from] [to]    set the date bounds (yyyy-mm-dd), '-' leaves a side open\n\
     \x20 sort <order>         date_desc, date_asc, quantity_desc, quantity_asc,\n\
     \x20                      customer_name_asc or customer_name_desc\n\
     \x20 page <n>             jump to a page\n\
     \x20 next, prev           step through pages\n\
     \x20 clear                clear search, filters and bounds\n\
     \x20 options              show the available filter values\n\
     \x20 help                 show this text\n\
     \x20 quit                 leave the dashboard"
}

/// Parse one line of console input.
///
/// Bad input at the prompt is part of normal operation, so problems come
/// back as a message to print rather than a crate error.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    match keyword {
        "search" | "s" => Ok(Command::Search(rest.to_owned())),
        "region" => toggle_command(FilterField::Regions, rest),
        "gender" => toggle_command(FilterField::Genders, rest),
        "category" | "cat" => toggle_command(FilterField::Categories, rest),
        "tag" => toggle_command(FilterField::Tags, rest),
        "pay" | "payment" => toggle_command(FilterField::PaymentMethods, rest),
        "age" => parse_age_bounds(rest),
        "dates" | "date" => parse_date_bounds(rest),
        "sort" => SortOrder::from_query_value(rest).map(Command::Sort).ok_or_else(|| {
            format!(
                "unknown sort order \"{rest}\"; one of: {}",
                SortOrder::ALL.map(SortOrder::as_query_value).join(", ")
            )
        }),
        "page" => rest
            .parse()
            .map(Command::Page)
            .map_err(|_| format!("\"{rest}\" is not a page number")),
        "next" | "n" => Ok(Command::NextPage),
        "prev" | "p" => Ok(Command::PreviousPage),
        "clear" => Ok(Command::ClearFilters),
        "options" => Ok(Command::ShowOptions),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "" => Err("type \"help\" for the list of commands".to_owned()),
        other => Err(format!(
            "unknown command \"{other}\"; type \"help\" for the list of commands"
        )),
    }
}

fn toggle_command(field: FilterField, value: &str) -> Result<Command, String> {
    if value.is_empty() {
        Err(format!(
            "{} needs a value to toggle; see \"options\" for the choices",
            field.label()
        ))
    } else {
        Ok(Command::Toggle(field, value.to_owned()))
    }
}

fn parse_age_bounds(rest: &str) -> Result<Command, String> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Ok(Command::AgeRange(None, None)),
        [min] => Ok(Command::AgeRange(parse_age_bound(min)?, None)),
        [min, max] => Ok(Command::AgeRange(
            parse_age_bound(min)?,
            parse_age_bound(max)?,
        )),
        _ => Err("age takes at most two bounds, e.g. \"age 18 40\"".to_owned()),
    }
}

fn parse_age_bound(token: &str) -> Result<Option<u32>, String> {
    if token == "-" {
        return Ok(None);
    }
    token
        .parse()
        .map(Some)
        .map_err(|_| format!("\"{token}\" is not an age"))
}

fn parse_date_bounds(rest: &str) -> Result<Command, String> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Ok(Command::DateRange(None, None)),
        [from] => Ok(Command::DateRange(parse_date_bound(from)?, None)),
        [from, to] => Ok(Command::DateRange(
            parse_date_bound(from)?,
            parse_date_bound(to)?,
        )),
        _ => Err("dates takes at most two bounds, e.g. \"dates 2023-01-01 2023-12-31\"".to_owned()),
    }
}

fn parse_date_bound(token: &str) -> Result<Option<Date>, String> {
    if token == "-" {
        return Ok(None);
    }
    Date::parse(token, DATE_FORMAT)
        .map(Some)
        .map_err(|_| format!("\"{token}\" is not a yyyy-mm-dd date"))
}
