use std::io::{self, BufRead as _, Write as _};

use crate::clockify::SinkCatalog;
use crate::mapping::MappingStore;
use crate::model::CatalogEntry;
use crate::report::{Format, trace};

/// Operator-input seam. Tests script it; the binary reads stdin.
pub trait Prompt {
    /// Show `question` and read one line of input. `None` on EOF.
    fn ask(&mut self, question: &str) -> Option<String>;
}

/// Reads stdin. In json mode the question goes to stderr so stdout stays a
/// single parseable report object.
pub struct StdinPrompt {
    pub format: Format,
}

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Option<String> {
        match self.format {
            Format::Json => {
                eprint!("{question}");
                io::stderr().flush().ok()?;
            }
            Format::Pretty => {
                print!("{question}");
                io::stdout().flush().ok()?;
            }
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

/// Present `entries` as a 1-based list and read an ordinal. Out-of-range or
/// non-numeric input fails closed.
fn pick<'a>(
    entries: &'a [CatalogEntry],
    what: &str,
    prompt: &mut impl Prompt,
    format: Format,
) -> Option<&'a CatalogEntry> {
    trace(format, &format!("Available {what}s:"));
    for (i, entry) in entries.iter().enumerate() {
        trace(format, &format!("  {}. {}", i + 1, entry.name));
    }
    let answer = prompt.ask(&format!("Select a {what} by number: "))?;
    let ordinal: usize = match answer.trim().parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("not a number: {answer:?}");
            return None;
        }
    };
    if ordinal == 0 || ordinal > entries.len() {
        eprintln!("selection {ordinal} is out of range (1-{})", entries.len());
        return None;
    }
    Some(&entries[ordinal - 1])
}

/// Walk the operator through classifying an unmapped tag: pick a client from
/// the sink catalog, pick one of its projects, then optionally persist the
/// new mapping under the chosen *names*. Any sink-query failure, empty
/// catalog, or invalid selection aborts and returns `None`; the calling
/// interval is skipped and nothing is retried here.
pub fn resolve<C: SinkCatalog, P: Prompt>(
    tag: &str,
    catalog: &C,
    prompt: &mut P,
    store: &MappingStore,
    format: Format,
) -> Option<(String, String)> {
    trace(
        format,
        &format!("Tag {tag:?} is not mapped to a client/project yet."),
    );

    let clients = match catalog.clients() {
        Ok(clients) => clients,
        Err(e) => {
            eprintln!("could not list clients: {e}");
            return None;
        }
    };
    if clients.is_empty() {
        eprintln!("no clients found in clockify");
        return None;
    }
    let client = pick(&clients, "client", prompt, format)?;

    let projects = match catalog.projects(&client.id) {
        Ok(projects) => projects,
        Err(e) => {
            eprintln!("could not list projects for client {}: {e}", client.name);
            return None;
        }
    };
    if projects.is_empty() {
        eprintln!("client {} has no projects", client.name);
        return None;
    }
    let project = pick(&projects, "project", prompt, format)?;

    let question = format!(
        "Save mapping {tag}={}/{} for future runs? (y/N): ",
        client.name, project.name
    );
    // EOF on the persist prompt counts as "no"; the selection still stands.
    if let Some(answer) = prompt.ask(&question)
        && matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
        && let Err(e) = store.append(tag, &client.name, &project.name)
    {
        eprintln!("could not save mapping: {e}");
    }

    Some((client.name.clone(), project.name.clone()))
}
