//! Interactive line-oriented shell.
//!
//! The shell keeps one [`RecordController`], one [`FormSession`] and one
//! [`DetailViewer`] alive between commands, so the add/edit form and the
//! local-only delete behave the same way they would behind a window.
//!
//! Failures of a single command are reported on the output and the shell
//! keeps going. Only I/O errors on the output or input end the session.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::config::DisplayFormat;
use crate::controller::RecordController;
use crate::error::{Error, Result};
use crate::render;
use crate::session::FormSession;
use crate::sighting::SightingId;
use crate::store::RecordStore;
use crate::validation::Field;
use crate::viewer::DetailViewer;

const PROMPT: &str = "squirrels> ";

const STALE_NOTICE: &str = "Saved, but the list could not be reloaded. Run 'refresh' to try again.";

const RETRY_HINT: &str = "Nothing was changed. Run the command again to retry.";

const HELP: &str = "\
Commands:
  list [PAGE]              Show a page of sightings
  stats                    Show totals
  refresh                  Reload sightings from the store
  add [FIELD=VALUE ...]    Open the add form
  edit ID [FIELD=VALUE ...]
                           Open the edit form for a sighting
  set FIELD=VALUE ...      Change fields on the open form
  form                     Show the open form
  save                     Submit the open form
  cancel                   Close the form without saving
  view ID                  Show one sighting in detail
  close                    Close the detail view
  favorite ID              Toggle the favorite flag
  delete ID                Hide a sighting until the next refresh
  help                     Show this message
  quit                     Leave the shell

Fields: name, species, location, size, color, behavior, dateSpotted, notes,
isFavorite. Quote values with spaces: species=\"Gray Squirrel\".";

/// Whether the shell should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop.
    Quit,
}

/// Interactive session over a record store.
#[derive(Debug)]
pub struct Shell<S> {
    controller: RecordController<S>,
    form: FormSession,
    viewer: DetailViewer,
    page_size: usize,
    format: DisplayFormat,
    page: usize,
}

impl<S: RecordStore> Shell<S> {
    /// Create a shell showing `page_size` sightings per page.
    #[must_use]
    pub fn new(controller: RecordController<S>, page_size: usize, format: DisplayFormat) -> Self {
        Self {
            controller,
            form: FormSession::new(),
            viewer: DetailViewer::new(),
            page_size: page_size.max(1),
            format,
            page: 1,
        }
    }

    /// The controller behind this shell.
    #[must_use]
    pub fn controller(&self) -> &RecordController<S> {
        &self.controller
    }

    /// The add/edit form.
    #[must_use]
    pub fn form(&self) -> &FormSession {
        &self.form
    }

    /// The detail viewer.
    #[must_use]
    pub fn viewer(&self) -> &DetailViewer {
        &self.viewer
    }

    /// Load the list once, then execute commands from `input` until it ends
    /// or a `quit` command is read.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub async fn run<R>(&mut self, input: R, out: &mut impl Write) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        if let Err(e) = self.controller.refresh().await {
            writeln!(out, "{e}")?;
        }

        let mut lines = input.lines();
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                break;
            };
            if self.execute(&line, out).await? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Execute one command line.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing to `out` fails.
    pub async fn execute(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let words = match split_words(line) {
            Ok(words) => words,
            Err(message) => {
                writeln!(out, "{message}")?;
                return Ok(Flow::Continue);
            }
        };
        let Some((command, args)) = words.split_first() else {
            return Ok(Flow::Continue);
        };

        debug!("Shell command: {}", command);
        match self.dispatch(command, args, out).await {
            Ok(flow) => Ok(flow),
            Err(Error::Io(e)) => Err(Error::Io(e)),
            Err(Error::Validation(errors)) => {
                writeln!(out, "Form not saved:")?;
                render::validation(out, &errors)?;
                Ok(Flow::Continue)
            }
            Err(e) if e.is_store_failure() => {
                writeln!(out, "{e}")?;
                writeln!(out, "{RETRY_HINT}")?;
                Ok(Flow::Continue)
            }
            Err(e) => {
                writeln!(out, "{e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn dispatch(
        &mut self,
        command: &str,
        args: &[String],
        out: &mut impl Write,
    ) -> Result<Flow> {
        match command {
            "help" | "?" => writeln!(out, "{HELP}")?,
            "quit" | "exit" => return Ok(Flow::Quit),
            "list" | "ls" => self.list(args, out)?,
            "stats" => render::stats(out, &self.controller.stats(), self.format)?,
            "refresh" => {
                let count = self.controller.refresh().await?;
                writeln!(out, "Loaded {count} squirrels.")?;
            }
            "add" => {
                self.form.open_for_create();
                self.assign(args, out)?;
                render::form(out, &self.form)?;
            }
            "edit" => {
                let Some(id) = require_id(command, args, out)? else {
                    return Ok(Flow::Continue);
                };
                let record = self.controller.get(id)?;
                self.form.open_for_edit(record);
                self.assign(&args[1..], out)?;
                render::form(out, &self.form)?;
            }
            "set" => {
                if !self.form.is_open() {
                    return Err(Error::FormClosed);
                }
                self.assign(args, out)?;
                render::form(out, &self.form)?;
            }
            "form" => render::form(out, &self.form)?,
            "save" => {
                let saved = self.form.confirm_current(&self.controller).await?;
                writeln!(out, "{}", saved.kind.message())?;
                if saved.stale {
                    writeln!(out, "{STALE_NOTICE}")?;
                }
            }
            "cancel" => {
                if self.form.is_open() {
                    self.form.cancel();
                    writeln!(out, "Form closed.")?;
                } else {
                    writeln!(out, "No form is open.")?;
                }
            }
            "view" => {
                let Some(id) = require_id(command, args, out)? else {
                    return Ok(Flow::Continue);
                };
                let record = self.controller.get(id)?;
                render::detail(out, &record, self.format)?;
                self.viewer.open(record);
            }
            "close" => self.viewer.close(),
            "favorite" | "fav" => {
                let Some(id) = require_id(command, args, out)? else {
                    return Ok(Flow::Continue);
                };
                let record = self.controller.get(id)?;
                let toggled = self.controller.toggle_favorite(&record).await?;
                writeln!(out, "{}", toggled.direction)?;
                if toggled.stale {
                    writeln!(out, "{STALE_NOTICE}")?;
                }
            }
            "delete" | "rm" => {
                let Some(id) = require_id(command, args, out)? else {
                    return Ok(Flow::Continue);
                };
                if !self.controller.remove(id) {
                    return Err(Error::NotFound { id });
                }
                writeln!(
                    out,
                    "Squirrel {id} removed from the list. It will return on the next refresh."
                )?;
            }
            other => {
                writeln!(
                    out,
                    "Unknown command '{other}'. Type 'help' for a list of commands."
                )?;
            }
        }
        Ok(Flow::Continue)
    }

    fn list(&mut self, args: &[String], out: &mut impl Write) -> Result<()> {
        let number = match args.first() {
            None => self.page,
            Some(raw) => match raw.parse::<usize>() {
                Ok(number) => number,
                Err(_) => {
                    writeln!(out, "'{raw}' is not a page number.")?;
                    return Ok(());
                }
            },
        };

        let page = self.controller.page(number, self.page_size);
        self.page = page.number;
        render::page(out, &page, self.format)
    }

    /// Apply `FIELD=VALUE` words to the open form. Bad words are reported
    /// and skipped.
    fn assign(&mut self, args: &[String], out: &mut impl Write) -> Result<()> {
        let values = self.form.values_mut()?;
        for arg in args {
            let Some((key, raw)) = arg.split_once('=') else {
                writeln!(out, "Expected FIELD=VALUE, got '{arg}'.")?;
                continue;
            };
            let Some(field) = Field::from_key(key) else {
                writeln!(out, "Unknown field '{key}'.")?;
                continue;
            };
            if let Err(e) = values.set(field, raw) {
                writeln!(out, "{e}")?;
            }
        }
        Ok(())
    }
}

fn require_id(
    command: &str,
    args: &[String],
    out: &mut impl Write,
) -> Result<Option<SightingId>> {
    let Some(raw) = args.first() else {
        writeln!(out, "Usage: {command} ID")?;
        return Ok(None);
    };
    match raw.parse() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            writeln!(out, "'{raw}' is not a sighting id.")?;
            Ok(None)
        }
    }
}

/// Split a command line into words with POSIX shell quoting rules.
fn split_words(line: &str) -> std::result::Result<Vec<String>, &'static str> {
    shlex::split(line).ok_or("Unterminated quote.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FormState;
    use crate::sighting::{fixtures, Species};
    use crate::store::testing::{Outcome, ScriptedStore};
    use crate::store::Storage;

    fn scripted(records: Vec<crate::sighting::Sighting>) -> Shell<ScriptedStore> {
        let controller = RecordController::new(ScriptedStore::with_records(records));
        Shell::new(controller, 10, DisplayFormat::Plain)
    }

    async fn exec<S: RecordStore>(shell: &mut Shell<S>, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = shell.execute(line, &mut out).await.unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("  list   2 ").unwrap(), vec!["list", "2"]);
        assert_eq!(
            split_words(r#"add species="Gray Squirrel" name='Mr Nutkin'"#).unwrap(),
            vec!["add", "species=Gray Squirrel", "name=Mr Nutkin"]
        );
        assert_eq!(
            split_words(r#"set name="O'Malley" notes="""#).unwrap(),
            vec!["set", "name=O'Malley", "notes="]
        );
        assert_eq!(
            split_words(r"add name=Nutkin\ Jr location=Park").unwrap(),
            vec!["add", "name=Nutkin Jr", "location=Park"]
        );
        assert!(split_words("").unwrap().is_empty());
        assert!(split_words("set name=\"open").is_err());
    }

    #[tokio::test]
    async fn test_add_and_save_with_sqlite() {
        let controller = RecordController::new(Storage::open_in_memory().unwrap());
        let mut shell = Shell::new(controller, 10, DisplayFormat::Table);

        let (_, text) = exec(
            &mut shell,
            r#"add name=Nutkin species="gray squirrel" location="Central Park""#,
        )
        .await;
        assert!(text.starts_with("Add New Squirrel"));
        assert!(shell.form().is_open());

        let (_, text) = exec(&mut shell, "save").await;
        assert_eq!(text.trim(), "Squirrel added successfully!");
        assert!(!shell.form().is_open());
        assert_eq!(shell.controller().len(), 1);

        let record = &shell.controller().records()[0];
        assert_eq!(record.data.species, Species::Gray);
        assert!(!record.data.is_favorite);

        let (_, text) = exec(&mut shell, "list").await;
        assert!(text.contains("Nutkin"));
        assert!(text.contains("Central Park"));
    }

    #[tokio::test]
    async fn test_save_reports_missing_fields() {
        let mut shell = scripted(Vec::new());
        exec(&mut shell, "add name=Nutkin").await;

        let (flow, text) = exec(&mut shell, "save").await;
        assert_eq!(flow, Flow::Continue);
        assert!(text.contains("Form not saved:"));
        assert!(text.contains("Please select a species!"));
        assert!(text.contains("Please enter the location!"));
        assert!(!text.contains("Please enter a name"));
        assert!(shell.form().is_open());
        assert!(shell.controller().store().create_calls().is_empty());
    }

    #[tokio::test]
    async fn test_bad_assignments_are_reported() {
        let mut shell = scripted(Vec::new());
        let (_, text) = exec(&mut shell, "add species=Squirrelzilla colour=Red name").await;
        assert!(text.contains("invalid value for species"));
        assert!(text.contains("Unknown field 'colour'"));
        assert!(text.contains("Expected FIELD=VALUE, got 'name'"));
        assert!(shell.form().values().species.is_none());
    }

    #[tokio::test]
    async fn test_escaped_spaces_stay_in_value() {
        let mut shell = scripted(Vec::new());
        let (_, text) = exec(&mut shell, r"add name=Nutkin\ Jr location=Park").await;
        assert!(!text.contains("Expected FIELD=VALUE"));
        assert_eq!(shell.form().values().name, "Nutkin Jr");
        assert_eq!(shell.form().values().location, "Park");
    }

    #[tokio::test]
    async fn test_set_requires_open_form() {
        let mut shell = scripted(Vec::new());
        let (_, text) = exec(&mut shell, "set name=Nutkin").await;
        assert_eq!(text.trim(), "no add or edit form is open");
    }

    #[tokio::test]
    async fn test_edit_updates_record() {
        let mut favorite = fixtures::sighting(4, "Nutkin", Species::Red);
        favorite.data.is_favorite = true;
        let mut shell = scripted(vec![favorite]);
        shell.controller().refresh().await.unwrap();

        let (_, text) = exec(&mut shell, "edit 4 location=\"Oak Grove\"").await;
        assert!(text.starts_with("Edit Squirrel"));
        assert!(matches!(shell.form().state(), FormState::Editing(r) if r.id.get() == 4));

        let (_, text) = exec(&mut shell, "save").await;
        assert_eq!(text.trim(), "Squirrel updated successfully!");

        let updates = shell.controller().store().update_calls();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, SightingId::new(4));
        assert_eq!(updates[0].1.location, "Oak Grove");
        assert!(updates[0].1.is_favorite);
    }

    #[tokio::test]
    async fn test_edit_unknown_id() {
        let mut shell = scripted(Vec::new());
        let (_, text) = exec(&mut shell, "edit 99").await;
        assert_eq!(text.trim(), "no sighting with id 99");
        assert!(!shell.form().is_open());

        let (_, text) = exec(&mut shell, "edit abc").await;
        assert!(text.contains("'abc' is not a sighting id"));
    }

    #[tokio::test]
    async fn test_save_failure_keeps_form_open() {
        let mut shell = scripted(Vec::new());
        shell.controller().store().script_create(Outcome::Fail);

        exec(
            &mut shell,
            "add name=Chippy species=Chipmunk location=\"Garden wall\"",
        )
        .await;
        let (_, text) = exec(&mut shell, "save").await;
        assert!(text.starts_with("Failed to save squirrel"));
        assert_eq!(text.lines().nth(1), Some(RETRY_HINT));
        assert!(shell.form().is_open());
        assert_eq!(shell.form().values().name, "Chippy");
    }

    #[tokio::test]
    async fn test_stale_notice_after_save() {
        let mut shell = scripted(Vec::new());
        shell.controller().store().script_list(Outcome::Fail);

        exec(&mut shell, "add name=Chippy species=Chipmunk location=Wall").await;
        let (_, text) = exec(&mut shell, "save").await;
        assert!(text.contains("Squirrel added successfully!"));
        assert!(text.contains(STALE_NOTICE));
        assert!(!shell.form().is_open());
    }

    #[tokio::test]
    async fn test_favorite_toggle() {
        let mut shell = scripted(vec![fixtures::sighting(1, "Nutkin", Species::Red)]);
        shell.controller().refresh().await.unwrap();

        let (_, text) = exec(&mut shell, "favorite 1").await;
        assert_eq!(text.trim(), "Added to favorites!");
        assert!(shell.controller().records()[0].data.is_favorite);

        let (_, text) = exec(&mut shell, "fav 1").await;
        assert_eq!(text.trim(), "Removed from favorites!");

        shell.controller().store().script_update(Outcome::Reject);
        let (_, text) = exec(&mut shell, "favorite 1").await;
        assert!(text.starts_with("Failed to update favorite status"));
        assert!(text.contains(RETRY_HINT));
        assert!(!shell.controller().records()[0].data.is_favorite);
    }

    #[tokio::test]
    async fn test_delete_is_local_until_refresh() {
        let mut shell = scripted(vec![
            fixtures::sighting(1, "Nutkin", Species::Red),
            fixtures::sighting(2, "Chippy", Species::Chipmunk),
        ]);
        shell.controller().refresh().await.unwrap();

        let (_, text) = exec(&mut shell, "delete 1").await;
        assert!(text.contains("removed from the list"));
        assert_eq!(shell.controller().len(), 1);

        let (_, text) = exec(&mut shell, "rm 1").await;
        assert_eq!(text.trim(), "no sighting with id 1");

        let (_, text) = exec(&mut shell, "refresh").await;
        assert_eq!(text.trim(), "Loaded 2 squirrels.");
        assert_eq!(shell.controller().len(), 2);
    }

    #[tokio::test]
    async fn test_view_and_close() {
        let mut shell = scripted(vec![fixtures::sighting(3, "Rusty", Species::Fox)]);
        shell.controller().refresh().await.unwrap();

        let (_, text) = exec(&mut shell, "view 3").await;
        assert!(text.contains("Rusty"));
        assert!(text.contains("Fox Squirrel"));
        assert_eq!(shell.viewer().current().map(|r| r.id.get()), Some(3));

        exec(&mut shell, "close").await;
        assert!(!shell.viewer().is_open());
    }

    #[tokio::test]
    async fn test_cancel_discards_form() {
        let mut shell = scripted(Vec::new());
        exec(&mut shell, "add name=Nutkin").await;

        let (_, text) = exec(&mut shell, "cancel").await;
        assert_eq!(text.trim(), "Form closed.");
        assert!(!shell.form().is_open());

        let (_, text) = exec(&mut shell, "cancel").await;
        assert_eq!(text.trim(), "No form is open.");
    }

    #[tokio::test]
    async fn test_list_pages() {
        let records = (1..=12)
            .map(|i| fixtures::sighting(i, &format!("Squirrel {i}"), Species::Gray))
            .collect();
        let mut shell = scripted(records);
        shell.controller().refresh().await.unwrap();

        let (_, text) = exec(&mut shell, "list").await;
        assert!(text.contains("Page 1 of 2 (12 squirrels)"));
        assert!(!text.contains("Squirrel 11"));

        let (_, text) = exec(&mut shell, "list 2").await;
        assert!(text.contains("Squirrel 11"));
        assert!(text.contains("Page 2 of 2"));

        let (_, text) = exec(&mut shell, "list two").await;
        assert!(text.contains("'two' is not a page number"));
    }

    #[tokio::test]
    async fn test_unknown_command_and_quit() {
        let mut shell = scripted(Vec::new());
        let (flow, text) = exec(&mut shell, "dance").await;
        assert_eq!(flow, Flow::Continue);
        assert!(text.contains("Unknown command 'dance'"));

        let (flow, _) = exec(&mut shell, "   ").await;
        assert_eq!(flow, Flow::Continue);

        let (flow, _) = exec(&mut shell, "quit").await;
        assert_eq!(flow, Flow::Quit);
    }

    #[tokio::test]
    async fn test_run_loads_then_reads_commands() {
        let mut shell = scripted(vec![fixtures::sighting(1, "Nutkin", Species::Red)]);
        let input: &[u8] = b"stats\nquit\nlist\n";
        let mut out = Vec::new();

        shell.run(input, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(shell.controller().store().list_calls(), 1);
        assert!(text.contains("Total Squirrels: 1"));
        assert!(!text.contains("Nutkin"));
    }

    #[tokio::test]
    async fn test_run_reports_load_failure() {
        let mut shell = scripted(Vec::new());
        shell.controller().store().script_list(Outcome::Fail);
        let input: &[u8] = b"";
        let mut out = Vec::new();

        shell.run(input, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Failed to load squirrels"));
    }
}
