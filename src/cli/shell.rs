//! Interactive menu over stdin/stdout.
//!
//! Mirrors the classic numbered console menu. Mutations are saved right
//! away; end of input behaves like choosing exit.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use super::{render, Session};
use crate::domain::{Resource, User};

const MENU: &str = "
=== Library ===
1. Add user
2. Add resource
3. Loan resource
4. Return resource
5. List resources
6. List users
7. Loan history
8. Reserve resource
9. Release reservation
0. Exit
Option: ";

/// Reads answers and writes prompts
struct Prompter<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R, W> Prompter<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    /// Print a prompt and read one line. `None` on end of input.
    async fn ask(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;
        Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
    }

    /// Keep asking until the answer parses as a number
    async fn ask_number(&mut self, label: &str) -> Result<Option<i32>> {
        let mut label = label.to_string();
        loop {
            let Some(answer) = self.ask(&label).await? else {
                return Ok(None);
            };
            match answer.parse() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => label = "Enter a valid number: ".to_string(),
            }
        }
    }
}

/// Run the menu on the process's stdin and stdout
pub async fn run_stdio(session: &mut Session) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    run(session, input, std::io::stdout()).await
}

/// Run the menu until the user exits or input ends
pub async fn run<R, W>(session: &mut Session, input: R, out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut p = Prompter {
        lines: input.lines(),
        out,
    };

    loop {
        let Some(choice) = p.ask(MENU).await? else {
            break;
        };

        let keep_going = match choice.as_str() {
            "1" => add_user(session, &mut p).await?,
            "2" => add_resource(session, &mut p).await?,
            "3" => loan(session, &mut p).await?,
            "4" => return_resource(session, &mut p).await?,
            "5" => {
                let all: Vec<&Resource> = session.engine.resources().iter().collect();
                write!(p.out, "{}", render::resources(&all))?;
                true
            }
            "6" => {
                write!(p.out, "{}", render::users(session.engine.users()))?;
                true
            }
            "7" => {
                write!(p.out, "{}", render::history(&session.engine.history_entries()))?;
                true
            }
            "8" => reserve(session, &mut p, true).await?,
            "9" => reserve(session, &mut p, false).await?,
            "0" => {
                p.say("Goodbye.")?;
                false
            }
            _ => {
                p.say("Invalid option, try again.")?;
                true
            }
        };

        if !keep_going {
            break;
        }
    }

    Ok(())
}

// Each action returns Ok(false) when input ended mid-dialog.

async fn add_user<R, W>(session: &mut Session, p: &mut Prompter<R, W>) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let Some(id) = p.ask("User ID: ").await? else {
        return Ok(false);
    };
    let Some(name) = p.ask("User name: ").await? else {
        return Ok(false);
    };

    match session.engine.try_add_user(User::new(id, name)) {
        Ok(()) => {
            p.say("User added.")?;
            session.persist().await;
        }
        Err(e) => p.say(&format!("Error: {}", e))?,
    }
    Ok(true)
}

async fn add_resource<R, W>(session: &mut Session, p: &mut Prompter<R, W>) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let Some(kind) = p.ask("Type (1. Book, 2. Magazine, 3. DVD): ").await? else {
        return Ok(false);
    };
    if !matches!(kind.as_str(), "1" | "2" | "3") {
        p.say("Invalid type. No resource created.")?;
        return Ok(true);
    }

    let Some(id) = p.ask("Resource ID: ").await? else {
        return Ok(false);
    };
    let Some(title) = p.ask("Title: ").await? else {
        return Ok(false);
    };

    let resource = match kind.as_str() {
        "1" => match p.ask("Author: ").await? {
            Some(author) => Resource::book(id, title, author),
            None => return Ok(false),
        },
        "2" => match p.ask_number("Issue number: ").await? {
            Some(issue) => Resource::magazine(id, title, issue),
            None => return Ok(false),
        },
        _ => match p.ask_number("Duration in minutes: ").await? {
            Some(minutes) => Resource::dvd(id, title, minutes),
            None => return Ok(false),
        },
    };

    match session.engine.try_add_resource(resource) {
        Ok(()) => {
            p.say("Resource added.")?;
            session.persist().await;
        }
        Err(e) => p.say(&format!("Error: {}", e))?,
    }
    Ok(true)
}

async fn loan<R, W>(session: &mut Session, p: &mut Prompter<R, W>) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let Some(resource_id) = p.ask("Resource ID to loan: ").await? else {
        return Ok(false);
    };
    let Some(user_id) = p.ask("Borrowing user ID: ").await? else {
        return Ok(false);
    };

    match session.engine.loan(&resource_id, &user_id) {
        Ok(receipt) => {
            p.say(&format!("Resource loaned to {}.", receipt.user_name))?;
            session.persist().await;
        }
        Err(e) => p.say(&format!("Error: {}", e))?,
    }
    Ok(true)
}

async fn return_resource<R, W>(session: &mut Session, p: &mut Prompter<R, W>) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let Some(resource_id) = p.ask("Resource ID to return: ").await? else {
        return Ok(false);
    };

    match session.engine.return_resource(&resource_id) {
        Ok(()) => {
            p.say("Resource returned.")?;
            session.persist().await;
        }
        Err(e) => p.say(&format!("Error: {}", e))?,
    }
    Ok(true)
}

async fn reserve<R, W>(session: &mut Session, p: &mut Prompter<R, W>, hold: bool) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let Some(resource_id) = p.ask("Resource ID: ").await? else {
        return Ok(false);
    };

    let result = if hold {
        session.engine.reserve(&resource_id)
    } else {
        session.engine.release(&resource_id)
    };

    match result {
        Ok(()) if hold => p.say("Resource reserved.")?,
        Ok(()) => p.say("Reservation released.")?,
        Err(e) => p.say(&format!("Error: {}", e))?,
    }
    Ok(true)
}
