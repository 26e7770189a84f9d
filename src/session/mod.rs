//! Interactive dashboard session.
//!
//! Reads one command per line, updates the selection state, and re-renders
//! the whole view after every accepted change. Rejected input leaves the state
//! untouched. Assistant failures are printed and the session carries on; only
//! a failed (re)load ends it.

use crate::assistant::{self, Assistant, ServiceError};
use crate::error::DashboardError;
use crate::loader::DatasetCache;
use crate::models::{ChartKind, Dataset, Metric};
use crate::pipeline::{SelectionState, company_ids, validate_selection};
use crate::view;
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

const HELP: &str = "\
Commands:
  select ID[,ID...]   replace the company selection
  add ID              add one company
  clear               clear the selection
  metric NAME         LiquidityRatio | DebtToEquityRatio | FinancialExpenseCoverage
  chart KIND          bar | line | pie
  companies           list company ids
  ask QUESTION        ask the assistant
  reload              refetch the dataset
  help                show this text
  quit                leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select(Vec<String>),
    Add(String),
    Clear,
    Metric(Metric),
    Chart(ChartKind),
    Companies,
    Ask(String),
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command {0:?} (try `help`)")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Invalid(#[from] DashboardError),
}

fn split_ids(arg: &str) -> Vec<String> {
    arg.split([',', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((w, a)) => (w, a.trim()),
        None => (line, ""),
    };
    let need = |name: &'static str| {
        if arg.is_empty() {
            Err(CommandError::MissingArgument(name))
        } else {
            Ok(arg)
        }
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "select" => Command::Select(split_ids(need("select")?)),
        "add" => Command::Add(need("add")?.to_string()),
        "clear" => Command::Clear,
        "metric" => Command::Metric(need("metric")?.parse()?),
        "chart" => Command::Chart(need("chart")?.parse()?),
        "companies" => Command::Companies,
        // Blank questions are filtered later by `assistant::ask`.
        "ask" => Command::Ask(arg.to_string()),
        "reload" => Command::Reload,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(cmd))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<W> {
    cache: DatasetCache,
    assistant: Result<Box<dyn Assistant>, ServiceError>,
    persona: String,
    state: SelectionState,
    dataset: Arc<Dataset>,
    out: W,
}

impl<W: Write> Session<W> {
    /// Loads the dataset up front: without it there is no dashboard.
    pub async fn start(
        mut cache: DatasetCache,
        assistant: Result<Box<dyn Assistant>, ServiceError>,
        persona: String,
        state: SelectionState,
        out: W,
    ) -> Result<Self> {
        if let Err(e) = &assistant {
            warn!("Q&A disabled: {}", e);
        }
        let dataset = cache.get().await.context("Failed to load dataset")?;
        Ok(Self {
            cache,
            assistant,
            persona,
            state,
            dataset,
            out,
        })
    }

    #[cfg(test)]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn render(&mut self) -> Result<()> {
        let view = view::render(&self.state, &self.dataset)?;
        writeln!(self.out, "{}", view)?;
        Ok(())
    }

    /// Apply one command. Invalid selections are reported, not applied.
    pub async fn handle(&mut self, cmd: Command) -> Result<Flow> {
        match cmd {
            Command::Select(ids) => {
                if let Err(e) = validate_selection(&self.dataset, &ids) {
                    writeln!(self.out, "{}", e)?;
                    return Ok(Flow::Continue);
                }
                self.state.select(ids);
                self.render()?;
            }
            Command::Add(id) => {
                if let Err(e) = validate_selection(&self.dataset, std::slice::from_ref(&id)) {
                    writeln!(self.out, "{}", e)?;
                    return Ok(Flow::Continue);
                }
                self.state.add(id);
                self.render()?;
            }
            Command::Clear => {
                self.state.clear();
                self.render()?;
            }
            Command::Metric(metric) => {
                self.state.metric = metric;
                self.render()?;
            }
            Command::Chart(kind) => {
                self.state.chart = kind;
                self.render()?;
            }
            Command::Companies => {
                let ids = company_ids(&self.dataset);
                writeln!(self.out, "{} companies: {}", ids.len(), ids.join(", "))?;
            }
            Command::Ask(question) => self.ask(&question).await?,
            Command::Reload => {
                self.cache.invalidate();
                self.dataset = self.cache.get().await.context("Failed to reload dataset")?;
                if let Some(key) = self.cache.key() {
                    writeln!(
                        self.out,
                        "Reloaded {} records from {} at {}",
                        self.dataset.len(),
                        key.location,
                        key.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
                    )?;
                }
                let dropped = self.state.retain_known(&self.dataset);
                if !dropped.is_empty() {
                    writeln!(self.out, "No longer in the dataset: {}", dropped.join(", "))?;
                }
                self.render()?;
            }
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn ask(&mut self, question: &str) -> Result<()> {
        let client = match &self.assistant {
            Ok(a) => a.as_ref(),
            Err(e) => {
                writeln!(self.out, "Assistant unavailable: {}", e)?;
                return Ok(());
            }
        };

        match assistant::ask(client, &self.persona, question).await {
            Ok(Some(reply)) => writeln!(self.out, "{}", reply)?,
            Ok(None) => writeln!(self.out, "Type a question after `ask`.")?,
            Err(e) => {
                warn!("Assistant call failed: {}", e);
                writeln!(self.out, "Assistant unavailable: {}", e)?;
            }
        }
        Ok(())
    }

    /// Render once, then process lines until `quit` or end of input.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        self.render()?;
        writeln!(self.out, "Type `help` for commands.")?;
        self.out.flush()?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let flow = match parse_command(&line) {
                Ok(Some(cmd)) => self.handle(cmd).await?,
                Ok(None) => Flow::Continue,
                Err(e) => {
                    writeln!(self.out, "{}", e)?;
                    Flow::Continue
                }
            };
            self.out.flush()?;
            if flow == Flow::Quit {
                break;
            }
        }

        info!("Session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result as DashResult;
    use crate::loader::DataSource;
    use async_trait::async_trait;

    const CSV: &str = "Company_ID,Industry,Current_Assets,Current_Liabilities,Short_Term_Debt,Long_Term_Debt,Equity,Total_Revenue,Financial_Expenses\n\
                       A,Tech,200,100,10,20,60,500,25\n\
                       B,Tech,50,100,5,5,20,80,8\n\
                       C,Retail,30,0,5,5,20,90,9\n";

    struct Memory;

    #[async_trait]
    impl DataSource for Memory {
        fn location(&self) -> String {
            "memory".to_string()
        }

        async fn fetch(&self) -> DashResult<String> {
            Ok(CSV.to_string())
        }
    }

    struct Echo;

    #[async_trait]
    impl Assistant for Echo {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, ServiceError> {
            Ok(format!("echo: {}", prompt))
        }
    }

    fn session(assistant: Result<Box<dyn Assistant>, ServiceError>) -> Session<Vec<u8>> {
        tokio_test::block_on(Session::start(
            DatasetCache::new(Box::new(Memory)),
            assistant,
            "persona".to_string(),
            SelectionState::new(Metric::LiquidityRatio, ChartKind::Bar),
            Vec::new(),
        ))
        .unwrap()
    }

    fn output(s: Session<Vec<u8>>) -> String {
        String::from_utf8(s.into_output()).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("select A, B C").unwrap(),
            Some(Command::Select(vec!["A".into(), "B".into(), "C".into()]))
        );
        assert_eq!(
            parse_command("METRIC coverage").unwrap(),
            Some(Command::Metric(Metric::FinancialExpenseCoverage))
        );
        assert_eq!(parse_command("chart pie").unwrap(), Some(Command::Chart(ChartKind::Pie)));
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("ask").unwrap(), Some(Command::Ask(String::new())));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            parse_command("metric InvalidName"),
            Err(CommandError::Invalid(DashboardError::InvalidMetric(_)))
        ));
        assert!(matches!(parse_command("chart"), Err(CommandError::MissingArgument("chart"))));
        assert!(matches!(parse_command("frobnicate"), Err(CommandError::Unknown(_))));
    }

    #[test]
    fn test_invalid_selection_keeps_state() {
        let mut s = session(Ok(Box::new(Echo)));
        tokio_test::block_on(s.handle(Command::Select(vec!["A".into()]))).unwrap();
        tokio_test::block_on(s.handle(Command::Select(vec!["A".into(), "ZZZ".into()]))).unwrap();
        assert_eq!(s.state().companies(), ["A"]);
        let out = output(s);
        assert!(out.contains("unknown company id(s): ZZZ"));
    }

    #[test]
    fn test_run_renders_after_each_change() {
        let mut s = session(Ok(Box::new(Echo)));
        let input: &[u8] = b"select A,C\nchart pie\nmetric nope\nask  how solvent is Tech?\nquit\nselect B\n";
        tokio_test::block_on(s.run(input)).unwrap();
        assert_eq!(s.state().chart, ChartKind::Pie);
        assert_eq!(s.state().metric, Metric::LiquidityRatio);
        assert_eq!(s.state().companies(), ["A", "C"]);
        let out = output(s);
        assert!(out.contains("No companies selected"));
        assert!(out.contains("Liquidity Ratio by Company [pie]"));
        assert!(out.contains("invalid metric \"nope\""));
        assert!(out.contains("echo: how solvent is Tech?"));
    }

    #[test]
    fn test_missing_assistant_keeps_dashboard_usable() {
        let mut s = session(Err(ServiceError::MissingCredential));
        tokio_test::block_on(s.handle(Command::Ask("hello".into()))).unwrap();
        tokio_test::block_on(s.handle(Command::Metric(Metric::DebtToEquityRatio))).unwrap();
        assert_eq!(s.state().metric, Metric::DebtToEquityRatio);
        let out = output(s);
        assert!(out.contains("Assistant unavailable: no API key configured"));
        assert!(out.contains("Financial Ratios by Sector"));
    }

    #[test]
    fn test_reload_refetches() {
        let mut s = session(Ok(Box::new(Echo)));
        tokio_test::block_on(s.handle(Command::Select(vec!["B".into()]))).unwrap();
        tokio_test::block_on(s.handle(Command::Reload)).unwrap();
        assert_eq!(s.state().companies(), ["B"]);
        let out = output(s);
        assert!(out.contains("Reloaded 3 records from memory"));
    }
}
