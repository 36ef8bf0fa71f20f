use std::fmt;
use std::str::FromStr;

use crate::format::{fmt_score, render, with_fmt_buf};
use crate::{IndividualTieredRanking, Location, Normalizer, Oracle};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("wrong number of arguments for '{command}' command")]
    WrongArity { command: String },
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("{what} '{value}' is not valid")]
    InvalidNumber { what: &'static str, value: String },
}

/// One line of a ranking script.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Insert { tier: usize, item: String },
    Remove { item: String },
    Rerank { item: String, position: usize },
    Move { item: String, tier: usize, position: usize },
    Rank { item: String },
    Range { start: isize, stop: isize },
    Score { item: String },
    Normalize { scale: Option<f64> },
    Show,
}

fn arity(args: &[&str], expected: usize) -> Result<(), ParseError> {
    if args.len() != expected {
        return Err(ParseError::WrongArity {
            command: args[0].to_ascii_lowercase(),
        });
    }
    Ok(())
}

fn parse_num<N: FromStr>(arg: &str, what: &'static str) -> Result<N, ParseError> {
    arg.parse().map_err(|_| ParseError::InvalidNumber {
        what,
        value: arg.to_owned(),
    })
}

impl Command {
    /// Parses one line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let args: Vec<&str> = line.split_whitespace().collect();
        let cmd = match args[0].to_ascii_lowercase().as_str() {
            "insert" => {
                arity(&args, 3)?;
                Command::Insert {
                    tier: parse_num(args[1], "tier")?,
                    item: args[2].to_owned(),
                }
            }
            "remove" => {
                arity(&args, 2)?;
                Command::Remove {
                    item: args[1].to_owned(),
                }
            }
            "rerank" => {
                arity(&args, 3)?;
                Command::Rerank {
                    item: args[1].to_owned(),
                    position: parse_num(args[2], "position")?,
                }
            }
            "move" => {
                arity(&args, 4)?;
                Command::Move {
                    item: args[1].to_owned(),
                    tier: parse_num(args[2], "tier")?,
                    position: parse_num(args[3], "position")?,
                }
            }
            "rank" => {
                arity(&args, 2)?;
                Command::Rank {
                    item: args[1].to_owned(),
                }
            }
            "range" => {
                arity(&args, 3)?;
                Command::Range {
                    start: parse_num(args[1], "index")?,
                    stop: parse_num(args[2], "index")?,
                }
            }
            "score" => {
                arity(&args, 2)?;
                Command::Score {
                    item: args[1].to_owned(),
                }
            }
            "normalize" => {
                if args.len() > 2 {
                    return Err(ParseError::WrongArity {
                        command: "normalize".to_owned(),
                    });
                }
                let scale = match args.get(1) {
                    Some(arg) => {
                        let scale: f64 = parse_num(arg, "scale")?;
                        if !scale.is_finite() || scale <= 0.0 {
                            return Err(ParseError::InvalidNumber {
                                what: "scale",
                                value: (*arg).to_owned(),
                            });
                        }
                        Some(scale)
                    }
                    None => None,
                };
                Command::Normalize { scale }
            }
            "show" => {
                arity(&args, 1)?;
                Command::Show
            }
            other => return Err(ParseError::UnknownCommand(other.to_owned())),
        };
        Ok(Some(cmd))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Placed(Location),
    Removed(Location),
    Rank(Option<usize>),
    Items(Vec<String>),
    Score(Option<f64>),
    Table(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Placed(loc) => write!(f, "placed tier={} bucket={}", loc.tier, loc.bucket),
            Reply::Removed(loc) => write!(f, "removed tier={} bucket={}", loc.tier, loc.bucket),
            Reply::Rank(Some(rank)) => write!(f, "{rank}"),
            Reply::Items(items) if items.is_empty() => f.write_str("(empty)"),
            Reply::Items(items) => f.write_str(&items.join(" ")),
            Reply::Score(Some(score)) => with_fmt_buf(|buf| f.write_str(fmt_score(buf, *score))),
            Reply::Rank(None) | Reply::Score(None) => f.write_str("(nil)"),
            Reply::Table(table) => f.write_str(table.trim_end()),
        }
    }
}

/// Runs `command` against `ranking`.
pub fn apply<O, N>(
    ranking: &mut IndividualTieredRanking<String, O, N>,
    command: Command,
) -> crate::Result<Reply>
where
    O: Oracle<String>,
    N: Normalizer<String>,
{
    let reply = match command {
        Command::Insert { tier, item } => Reply::Placed(ranking.insert(item, tier)?),
        Command::Remove { item } => Reply::Removed(ranking.remove(&item)?),
        Command::Rerank { item, position } => Reply::Placed(ranking.rerank(&item, position)?),
        Command::Move {
            item,
            tier,
            position,
        } => Reply::Placed(ranking.relocate(&item, tier, position)?),
        Command::Rank { item } => Reply::Rank(ranking.rank_of(&item)),
        Command::Range { start, stop } => Reply::Items(
            ranking
                .range(start, stop)
                .into_iter()
                .cloned()
                .collect(),
        ),
        Command::Score { item } => Reply::Score(ranking.score(&item)),
        Command::Normalize { scale } => {
            let scale = scale.unwrap_or(ranking.config().scale);
            ranking.normalize(scale)?;
            Reply::Table(render(ranking))
        }
        Command::Show => Reply::Table(render(ranking)),
    };
    Ok(reply)
}
