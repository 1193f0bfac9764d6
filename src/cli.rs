use std::io::{self, BufRead, Write};

use chrono::NaiveDateTime;

use tutor_booking::{
    api::HttpBookingClient,
    app::{AppError, BookingApp},
    booking::FeedState,
    checkout::{HandoffOutcome, Navigator},
    display::{
        agenda::{format_agenda_text, format_price},
        boundary::render_guarded,
        join::JoinView,
        session_card::format_session_card,
    },
    selection::{SelectionOutcome, SelectionState},
    storage::config::Config,
};

const USAGE: &str = "Usage: tutor-booking [--agenda] [--book <slot-id>] [--select <start> <end>] \
[--slot <start>] [--duration <60|90|120>] [--join <code>] [--next]\n\
Times are local, formatted YYYY-MM-DDTHH:MM.";

#[derive(Clone, Debug, PartialEq)]
pub enum CliMode {
    Agenda,
    Book(String),
    Select { start: NaiveDateTime, end: NaiveDateTime },
    Slot(NaiveDateTime),
    Join(String),
    Next,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CliArgs {
    pub mode: CliMode,
    pub duration: Option<u32>,
}

pub fn parse_cli_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliArgs, String> {
    let mut mode = None;
    let mut duration = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| format!("Missing value for {}", name))
        };
        match arg.as_str() {
            "--agenda" => mode = Some(CliMode::Agenda),
            "--next" => mode = Some(CliMode::Next),
            "--book" => mode = Some(CliMode::Book(value("--book")?)),
            "--join" => mode = Some(CliMode::Join(value("--join")?)),
            "--slot" => mode = Some(CliMode::Slot(parse_local(&value("--slot")?)?)),
            "--select" => {
                let start = parse_local(&value("--select")?)?;
                let end = parse_local(&value("--select")?)?;
                mode = Some(CliMode::Select { start, end });
            }
            "--duration" => {
                let raw = value("--duration")?;
                let minutes = raw
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid duration '{}'.", raw))?;
                duration = Some(minutes);
            }
            "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    Ok(CliArgs {
        mode: mode.unwrap_or(CliMode::Agenda),
        duration,
    })
}

pub fn usage() -> &'static str {
    USAGE
}

fn parse_local(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map_err(|_| format!("Invalid time '{}'. Use YYYY-MM-DDTHH:MM.", raw))
}

pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, url: &str) {
        println!("Continue to payment: {}", url);
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

pub async fn run(args: CliArgs, config: Config) -> anyhow::Result<()> {
    let api = HttpBookingClient::new(config.api.base_url.clone())
        .with_auth_token(config.api.auth_token.clone());
    let mut app = BookingApp::new(&config, api, TerminalNavigator)?;

    if let Some(minutes) = args.duration
        && let Err(e) = app.set_duration(minutes)
    {
        eprintln!("{}", e);
        return Ok(());
    }

    match args.mode {
        CliMode::Agenda => show_agenda(&app).await,
        CliMode::Book(id) => book_slot(&app, &id).await,
        CliMode::Select { start, end } => {
            let outcome = app.select(start, end);
            checkout_selection(&mut app, outcome).await
        }
        CliMode::Slot(start) => {
            let outcome = app.click_start(start);
            checkout_selection(&mut app, outcome).await
        }
        CliMode::Join(code) => join_class(&app, &code).await,
        CliMode::Next => show_next_session(&app).await,
    }

    Ok(())
}

async fn show_agenda(app: &BookingApp<HttpBookingClient, TerminalNavigator>) {
    match app.reload().await {
        FeedState::Ready(events) => {
            let hours = app.display_hours();
            println!(
                "{}",
                render_guarded("Failed to display calendar.", || format_agenda_text(&events, &hours))
            );
        }
        FeedState::Failed(_) | FeedState::Loading => {
            if let Some(notice) = app.load_failure_notice() {
                eprintln!("{}", notice);
            }
        }
    }
}

async fn book_slot(app: &BookingApp<HttpBookingClient, TerminalNavigator>, id: &str) {
    if let FeedState::Failed(_) = app.reload().await {
        if let Some(notice) = app.load_failure_notice() {
            eprintln!("{}", notice);
        }
        return;
    }

    let Some(event) = app.feed().find(id) else {
        eprintln!("No slot with id {}", id);
        return;
    };

    if !event.resource.is_full()
        && !confirm(&format!(
            "Book this {} slot for {}?",
            event.kind().label(),
            format_price(event.resource.price)
        ))
    {
        return;
    }

    report(app.book_event(id).await);
}

async fn checkout_selection(
    app: &mut BookingApp<HttpBookingClient, TerminalNavigator>,
    outcome: SelectionOutcome,
) {
    let SelectionState::Active(candidate) = app.selection().clone() else {
        tracing::info!("Selection gesture produced {:?}", outcome);
        println!("Nothing selected.");
        return;
    };

    let mut prompt = format!(
        "Selected {} - {} ({} min)",
        candidate.start.format("%a %Y-%m-%d %H:%M"),
        candidate.end.format("%H:%M"),
        candidate.duration_minutes()
    );
    if let Some(price) = app.price_preview() {
        prompt.push_str(&format!(", about {}", format_price(price)));
    }
    prompt.push_str(". Continue to payment?");

    if !confirm(&prompt) {
        app.cancel();
        return;
    }

    report(app.confirm_pending().await);
}

async fn join_class(app: &BookingApp<HttpBookingClient, TerminalNavigator>, code: &str) {
    let view = match app.join_view(code).await {
        Ok(view) => view,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return;
        }
    };

    println!("{}", view.render());
    if let JoinView::PayToJoin { price_cents, .. } = &view
        && !confirm(&format!("Pay {}?", format_price(*price_cents)))
    {
        return;
    }

    if let Err(e) = app.pay_to_join(&view).await {
        eprintln!("{}", e.user_message());
    }
}

async fn show_next_session(app: &BookingApp<HttpBookingClient, TerminalNavigator>) {
    match app.next_session().await {
        Ok(session) => println!(
            "{}",
            render_guarded("Failed to load session.", || format_session_card(&session))
        ),
        Err(e) => {
            tracing::error!("Failed to load next session: {}", e);
            eprintln!("Error loading session.");
        }
    }
}

fn report(result: Result<HandoffOutcome, AppError>) {
    match result {
        Ok(outcome) => {
            if let Some(notice) = outcome.notice() {
                println!("{}", notice);
            }
        }
        Err(e) => eprintln!("{}", e.user_message()),
    }
}
