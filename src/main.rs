// SPDX-License-Identifier: MPL-2.0
use agrisaathi::app::{AppContext, Flags};
use agrisaathi::chat::{Conversation, Sender, SUGGESTIONS};
use agrisaathi::forms::{LoginForm, SignupForm};
use agrisaathi::i18n::LocaleTag;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
agrisaathi [--lang en|hi|mr] [--config-dir DIR]

Commands:
  /lang <en|hi|mr>                      switch language
  /login <email> <password>             sign in
  /signup <email> <password> <confirm> <full name>
  /logout                               sign out
  /whoami                               show the current user
  /chat                                 open the assistant
  /suggest                              list quick questions
  /help                                 show this text
  /quit                                 exit
Any other line is sent to the assistant.
";

enum Command {
    Lang(String),
    Login(LoginForm),
    Signup(SignupForm),
    Logout,
    Whoami,
    Chat,
    Suggest,
    Help,
    Quit,
    Message(String),
    Blank,
    Invalid(&'static str),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Blank;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Message(line.to_string());
        };
        let mut parts = rest.split_whitespace();
        match parts.next().unwrap_or_default() {
            "lang" => match parts.next() {
                Some(tag) => Command::Lang(tag.to_string()),
                None => Command::Invalid("usage: /lang <en|hi|mr>"),
            },
            "login" => {
                let email = parts.next().unwrap_or_default();
                let password = parts.next().unwrap_or_default();
                Command::Login(LoginForm::new(email, password))
            }
            "signup" => {
                let email = parts.next().unwrap_or_default().to_string();
                let password = parts.next().unwrap_or_default().to_string();
                let confirm_password = parts.next().unwrap_or_default().to_string();
                let name = parts.collect::<Vec<_>>().join(" ");
                Command::Signup(SignupForm {
                    name,
                    email,
                    password,
                    confirm_password,
                })
            }
            "logout" => Command::Logout,
            "whoami" => Command::Whoami,
            "chat" => Command::Chat,
            "suggest" => Command::Suggest,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Invalid("unknown command, try /help"),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_welcome(ctx: &AppContext) {
    let locale = &ctx.locale;
    println!("{}", locale.translate("selectLanguage"));
    for tag in LocaleTag::ALL {
        let marker = if tag == locale.locale() { '*' } else { ' ' };
        println!(
            " {marker} {} ({})",
            locale.translate(tag.native_name_key()),
            tag.code()
        );
    }
    println!();
    println!("{}", locale.translate("welcome"));
    println!("{}", locale.translate("tagline"));
    println!();
    println!("{}", locale.translate("whyChoose"));
    for n in 1..=3 {
        let title = format!("feature{n}Title");
        let desc = format!("feature{n}Desc");
        println!("  - {}: {}", locale.translate(&title), locale.translate(&desc));
    }
    println!();
    println!(
        "{} / {}",
        locale.translate("login"),
        locale.translate("getStarted")
    );
}

/// Prints pending toasts once; a terminal has nowhere to keep them.
fn flush_notifications(ctx: &mut AppContext) {
    for notification in ctx.notifications.drain() {
        println!(
            "[{:?}] {}",
            notification.severity(),
            ctx.render_notification(&notification)
        );
    }
}

fn print_message(text: &str, sender: Sender) {
    match sender {
        Sender::Bot => println!("bot> {text}"),
        Sender::User => println!("you> {text}"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }
    let flags = Flags {
        lang: args.opt_value_from_str("--lang")?,
        config_dir: args.opt_value_from_str("--config-dir")?,
    };
    let remaining = args.finish();
    if !remaining.is_empty() {
        tracing::warn!("ignoring unexpected arguments: {remaining:?}");
    }

    let mut ctx = AppContext::bootstrap(&flags).await?;
    print_welcome(&ctx);
    flush_notifications(&mut ctx);

    let mut chat: Option<Conversation> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        ctx.tick();
        match Command::parse(&line) {
            Command::Lang(code) => match code.parse::<LocaleTag>() {
                Ok(tag) => {
                    ctx.select_language(tag);
                    print_welcome(&ctx);
                }
                Err(err) => println!("{err}"),
            },
            Command::Login(form) => {
                ctx.login(&form).await;
            }
            Command::Signup(form) => {
                ctx.signup(&form).await;
            }
            Command::Logout => {
                ctx.sign_out().await;
                chat = None;
            }
            Command::Whoami => match ctx.session.current_session() {
                Some(session) => println!("{} <{}>", session.label(), session.email),
                None => println!("{}", ctx.locale.translate("login")),
            },
            Command::Chat => {
                chat = ctx.open_chat();
                if let Some(conversation) = &chat {
                    println!("{}", ctx.locale.translate("chatTitle"));
                    for message in conversation.messages() {
                        print_message(&message.text, message.sender);
                    }
                }
            }
            Command::Suggest => {
                for suggestion in SUGGESTIONS {
                    println!("  {suggestion}");
                }
            }
            Command::Help => print!("{HELP}"),
            Command::Quit => break,
            Command::Blank => {}
            Command::Invalid(usage) => println!("{usage}"),
            Command::Message(text) => {
                if ctx.session.current_session().is_none() {
                    chat = None;
                }
                if chat.is_none() {
                    chat = ctx.open_chat();
                    if let Some(conversation) = &chat {
                        print_message(&conversation.messages()[0].text, Sender::Bot);
                    }
                }
                if let Some(conversation) = chat.as_mut() {
                    if let Some(reply) = conversation.ask(&text).await {
                        print_message(&reply.text, reply.sender);
                    }
                }
            }
        }
        flush_notifications(&mut ctx);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_not_a_message() {
        assert!(matches!(Command::parse(""), Command::Blank));
        assert!(matches!(Command::parse("   \t"), Command::Blank));
        assert!(matches!(Command::parse(" hello "), Command::Message(text) if text == "hello"));
    }

    #[test]
    fn signup_joins_full_name() {
        match Command::parse("/signup a@b.c secret1 secret1 Asha Devi") {
            Command::Signup(form) => {
                assert_eq!(form.email, "a@b.c");
                assert_eq!(form.name, "Asha Devi");
            }
            _ => panic!("expected signup"),
        }
    }
}
