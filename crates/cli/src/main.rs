use anyhow::Context;
use packclick_core::{
    all_skills, Card, Event, EventBus, GameState, Rarity, RngState, Session, SkillId,
};
use packclick_data::{clear_save, default_save_path, load_economy_config, load_game, save_game};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PACKCLICK_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    cui: bool,
    seed: Option<u64>,
    save_path: Option<PathBuf>,
    assets_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    All,
    Clear,
    /// Inclusive 1-based row spans, resolved against the current inventory.
    Rows(Vec<(usize, usize)>),
    Key(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Open(u32),
    OpenMax,
    Inventory,
    Select(Target),
    Sell(Option<Target>),
    Skills,
    Unlock(String),
    Status,
    Stats { json: bool },
    Save,
    Reset,
    Help,
    Quit,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        cui: false,
        seed: None,
        save_path: default_save_path(),
        assets_dir: PathBuf::from("assets"),
    };
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--cui" => options.cui = true,
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    options.seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            "--save" => {
                if let Some(value) = args.get(idx + 1) {
                    options.save_path = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--assets" => {
                if let Some(value) = args.get(idx + 1) {
                    options.assets_dir = PathBuf::from(value);
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    options
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    if options.cui {
        let launch = packclick_cui::LaunchOptions {
            seed: options.seed,
            save_path: options.save_path,
            assets_dir: options.assets_dir,
        };
        if let Err(err) = packclick_cui::run(launch) {
            eprintln!("cui launch error: {err:#}");
            std::process::exit(1);
        }
        return;
    }
    init_logging();
    if let Err(err) = run_repl(options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run_repl(options: CliOptions) -> anyhow::Result<()> {
    let config = load_economy_config(&options.assets_dir).context("load economy config")?;
    let state = match options.save_path.as_deref() {
        Some(path) => load_game(path, &config),
        None => GameState::new(&config),
    };
    let rng = options
        .seed
        .map(RngState::from_seed)
        .unwrap_or_else(RngState::from_entropy);
    tracing::info!(seed = rng.seed(), "session started");
    let mut session = Session::with_state(config, rng, state);
    let mut events = EventBus::default();

    print_help();
    print_status(&session);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush().context("flush stdout")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        let mutated = execute(&mut session, &mut events, command, &options)?;
        drain_events(&mut events);
        if mutated {
            autosave(&session, &options);
        }
    }
    Ok(())
}

/// Runs one command. Returns whether game state changed.
fn execute(
    session: &mut Session,
    events: &mut EventBus,
    command: Command,
    options: &CliOptions,
) -> anyhow::Result<bool> {
    let mutated = match command {
        Command::Open(count) => report(session.open_packs(count, events).map(|opening| {
            for card in &opening.cards {
                println!("  {}", format_card(card));
            }
            println!(
                "opened {} pack(s) for {}, {} cards",
                opening.packs,
                opening.total_cost,
                opening.cards.len()
            );
        })),
        Command::OpenMax => {
            let count = session.max_affordable_packs().max(1);
            return execute(session, events, Command::Open(count), options);
        }
        Command::Inventory => {
            print_inventory(session);
            false
        }
        Command::Select(target) => {
            match target {
                Target::All => session.state.select_all(),
                Target::Clear => session.state.clear_selection(),
                other => {
                    for key in resolve_target(session, &other) {
                        if !session.state.inventory.contains(&key) {
                            println!("no such stack: {key}");
                            continue;
                        }
                        session.state.toggle_selection(&key);
                    }
                }
            }
            println!("{} stack(s) selected", session.state.selection.len());
            false
        }
        Command::Sell(target) => {
            let result = match target {
                None => session.sell_selected(events),
                Some(Target::Clear) => {
                    println!("nothing to sell");
                    return Ok(false);
                }
                Some(other) => {
                    let keys = resolve_target(session, &other);
                    session.sell_entries(keys, events)
                }
            };
            report(result.map(|receipt| {
                println!(
                    "sold {} cards for {}",
                    receipt.cards_sold, receipt.total_value
                );
            }))
        }
        Command::Skills => {
            print_skills(session);
            false
        }
        Command::Unlock(id) => report(
            session
                .unlock_skill(&id, events)
                .map(|def| println!("unlocked {}: {}", def.name, def.description)),
        ),
        Command::Status => {
            print_status(session);
            false
        }
        Command::Stats { json } => {
            if json {
                let body = serde_json::to_string_pretty(&session.state.stats)
                    .context("serialize stats")?;
                println!("{body}");
            } else {
                print_stats(session);
            }
            false
        }
        Command::Save => {
            match options.save_path.as_deref() {
                Some(path) => match save_game(&session.state, path) {
                    Ok(()) => println!("saved to {}", path.display()),
                    Err(err) => {
                        tracing::warn!(path = %path.display(), "{err:#}");
                        println!("save failed: {err:#}");
                    }
                },
                None => println!("save path unavailable"),
            }
            false
        }
        Command::Reset => {
            if let Some(path) = options.save_path.as_deref() {
                if let Err(err) = clear_save(path) {
                    tracing::warn!(path = %path.display(), "{err:#}");
                    println!("could not remove save: {err:#}");
                }
            }
            session.state = GameState::new(&session.config);
            println!("progress reset");
            print_status(session);
            false
        }
        Command::Help => {
            print_help();
            false
        }
        Command::Quit => false,
    };
    Ok(mutated)
}

fn report<E: std::fmt::Display>(result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            println!("declined: {err}");
            false
        }
    }
}

fn autosave(session: &Session, options: &CliOptions) {
    let Some(path) = options.save_path.as_deref() else {
        return;
    };
    if let Err(err) = save_game(&session.state, path) {
        tracing::warn!(path = %path.display(), "{err:#}");
        println!("autosave failed: {err:#}");
    }
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();
    match cmd {
        "open" | "o" => match args.first() {
            None => Ok(Command::Open(1)),
            Some(value) => value
                .parse::<u32>()
                .map(Command::Open)
                .map_err(|_| format!("invalid pack count '{value}'")),
        },
        "max" | "m" => Ok(Command::OpenMax),
        "inv" | "inventory" | "i" => Ok(Command::Inventory),
        "select" => {
            if args.is_empty() {
                return Err("usage: select <row..>|<key>|all|none".to_string());
            }
            parse_target(&args).map(Command::Select)
        }
        "sell" => {
            if args.is_empty() {
                return Ok(Command::Sell(None));
            }
            parse_target(&args).map(|target| Command::Sell(Some(target)))
        }
        "skills" => Ok(Command::Skills),
        "unlock" | "u" => match args.first() {
            Some(id) => Ok(Command::Unlock((*id).to_string())),
            None => Err("usage: unlock <skill id>".to_string()),
        },
        "status" | "s" => Ok(Command::Status),
        "stats" => Ok(Command::Stats {
            json: args.first() == Some(&"json"),
        }),
        "save" => Ok(Command::Save),
        "reset" => Ok(Command::Reset),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', try help")),
    }
}

/// Row numbers from `inv` (`1,3-5`), `all`, `none`, or a full card key such as
/// `Iron Dagger_common`.
fn parse_target(args: &[&str]) -> Result<Target, String> {
    match args {
        ["all"] => return Ok(Target::All),
        ["none"] => return Ok(Target::Clear),
        _ => {}
    }
    if let Ok(rows) = parse_rows(args) {
        return Ok(Target::Rows(rows));
    }
    let key = args.join(" ");
    if key.contains('_') {
        Ok(Target::Key(key))
    } else {
        Err(format!("'{key}' is neither row numbers nor a card key"))
    }
}

fn parse_rows(args: &[&str]) -> Result<Vec<(usize, usize)>, String> {
    let mut rows = Vec::new();
    for arg in args {
        for part in arg.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some((start, end)) = part.split_once('-') {
                let start = start
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| "invalid range start".to_string())?;
                let end = end
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| "invalid range end".to_string())?;
                if start > end {
                    return Err("range start larger than end".to_string());
                }
                rows.push((start, end));
            } else {
                let row = part
                    .parse::<usize>()
                    .map_err(|_| format!("invalid row '{part}'"))?;
                rows.push((row, row));
            }
        }
    }
    if rows.is_empty() {
        return Err("missing rows".to_string());
    }
    Ok(rows)
}

fn resolve_target(session: &Session, target: &Target) -> Vec<String> {
    match target {
        Target::All => session.state.inventory.keys().cloned().collect(),
        Target::Clear => Vec::new(),
        Target::Key(key) => vec![key.clone()],
        Target::Rows(spans) => {
            let sorted = session.state.inventory.sorted();
            let mut keys = Vec::new();
            for &(start, end) in spans {
                let first = start.max(1);
                let last = end.min(sorted.len());
                for row in first..=last {
                    if let Some((key, _)) = sorted.get(row - 1) {
                        keys.push((*key).clone());
                    }
                }
            }
            keys
        }
    }
}

fn drain_events(events: &mut EventBus) {
    for event in events.drain() {
        match event {
            Event::LeveledUp {
                level,
                skill_points,
            } => println!("level up! now level {level}, {skill_points} skill point(s)"),
            Event::SkillUnlocked { skill_points, .. } => {
                println!("{skill_points} skill point(s) left")
            }
            other => tracing::debug!(event = ?other, "event"),
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  open [n]            buy and open n packs (default 1)");
    println!("  max                 open as many packs as you can afford");
    println!("  inv                 list inventory with row numbers");
    println!("  select <rows>|<key>|all|none");
    println!("                      toggle stacks for selling (rows like 1,3-5)");
    println!("  sell [rows|key|all] sell the given stacks, or the selection");
    println!("  skills              list skills");
    println!("  unlock <id>         unlock a skill");
    println!("  status | stats [json] | save | reset | help | quit");
}

fn print_status(session: &Session) {
    let progress = &session.state.progress;
    println!(
        "currency {} | level {} | xp {}/{} | skill points {}",
        progress.currency,
        progress.level,
        progress.xp,
        session.xp_needed(),
        progress.skill_points
    );
    println!(
        "pack cost {} | {} cards per pack | {} affordable",
        session.pack_cost(),
        session.cards_per_pack(),
        session.max_affordable_packs()
    );
}

fn print_inventory(session: &Session) {
    let state = &session.state;
    if state.inventory.is_empty() {
        println!("inventory is empty");
        return;
    }
    for (idx, (key, entry)) in state.inventory.sorted().into_iter().enumerate() {
        let marker = if state.selection.contains(key) { "*" } else { " " };
        println!(
            "{marker}{:>3}: {} ({}) x{} sells {}",
            idx + 1,
            entry.name,
            entry.rarity,
            entry.count,
            session.sell_value(entry)
        );
    }
    println!(
        "{} cards in {} stacks, worth {}",
        state.inventory.total_cards(),
        state.inventory.len(),
        session.inventory_value()
    );
}

fn print_skills(session: &Session) {
    for def in all_skills() {
        let marker = if session.state.skills.has(def.id) {
            "[x]"
        } else {
            "[ ]"
        };
        println!(
            "{marker} {:<16} {} pt  {}: {}",
            def.id.as_str(),
            def.cost,
            def.name,
            def.description
        );
    }
    println!(
        "{} skill point(s) available",
        session.state.progress.skill_points
    );
}

fn print_stats(session: &Session) {
    let stats = &session.state.stats;
    println!("packs opened    {}", stats.packs_opened);
    println!(
        "cards opened    {} ({} lucky)",
        stats.cards_opened, stats.bonus_cards
    );
    println!("cards sold      {}", stats.cards_sold);
    println!("currency spent  {}", stats.currency_spent);
    println!("currency earned {}", stats.currency_earned);
    println!("skills unlocked {}", stats.skills_unlocked);
    for rarity in Rarity::ALL {
        println!("  {:<10} {}", rarity.id(), stats.pulls_of(rarity));
    }
    if session.state.skills.has(SkillId::LuckyPacks) {
        println!("lucky packs active");
    }
}

fn format_card(card: &Card) -> String {
    format!("{} ({}) +{}xp", card.name, card.rarity, card.xp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use packclick_core::EconomyConfig;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn options() -> CliOptions {
        CliOptions {
            cui: false,
            seed: Some(1),
            save_path: None,
            assets_dir: PathBuf::from("assets"),
        }
    }

    fn unique_temp_file(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "packclick_cli_test_{tag}_{}_{}",
            std::process::id(),
            nanos
        ))
    }

    fn rich_session() -> Session {
        Session::new(
            EconomyConfig {
                starting_currency: 1_000,
                ..EconomyConfig::default()
            },
            RngState::from_seed(12),
        )
    }

    #[test]
    fn parses_launcher_flags() {
        let parsed = parse_cli_options(&args(&["--cui", "--seed", "9", "--save", "s.json"]));
        assert!(parsed.cui);
        assert_eq!(parsed.seed, Some(9));
        assert_eq!(parsed.save_path, Some(PathBuf::from("s.json")));
        assert_eq!(parsed.assets_dir, PathBuf::from("assets"));
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("open"), Ok(Command::Open(1)));
        assert_eq!(parse_command("open 3"), Ok(Command::Open(3)));
        assert!(parse_command("open lots").is_err());
        assert_eq!(parse_command("max"), Ok(Command::OpenMax));
        assert_eq!(parse_command("sell"), Ok(Command::Sell(None)));
        assert_eq!(parse_command("sell all"), Ok(Command::Sell(Some(Target::All))));
        assert_eq!(
            parse_command("select 1,3-4"),
            Ok(Command::Select(Target::Rows(vec![(1, 1), (3, 4)])))
        );
        assert_eq!(
            parse_command("select Iron Dagger_common"),
            Ok(Command::Select(Target::Key("Iron Dagger_common".to_string())))
        );
        assert_eq!(
            parse_command("unlock xp_boost"),
            Ok(Command::Unlock("xp_boost".to_string()))
        );
        assert_eq!(parse_command("stats json"), Ok(Command::Stats { json: true }));
        assert!(parse_command("select").is_err());
        assert!(parse_command("select banana").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn rows_resolve_against_display_order() {
        let mut session = rich_session();
        let mut events = EventBus::default();
        session.open_packs(2, &mut events).expect("open");
        let sorted: Vec<String> = session
            .state
            .inventory
            .sorted()
            .into_iter()
            .map(|(key, _)| key.clone())
            .collect();
        let keys = resolve_target(
            &session,
            &Target::Rows(vec![(1, 1), (0, 0), (999, 999)]),
        );
        assert_eq!(keys, vec![sorted[0].clone()]);
    }

    #[test]
    fn huge_row_ranges_stay_bounded_by_the_inventory() {
        let target = parse_command("select 1-18446744073709551615").expect("parse");
        assert_eq!(target, Command::Select(Target::Rows(vec![(1, usize::MAX)])));
        let mut session = rich_session();
        let mut events = EventBus::default();
        session.open_packs(1, &mut events).expect("open");
        let keys = resolve_target(&session, &Target::Rows(vec![(1, usize::MAX)]));
        assert_eq!(keys.len(), session.state.inventory.len());
    }

    #[test]
    fn save_and_reset_failures_keep_the_session_running() {
        let blocker = unique_temp_file("blocker");
        std::fs::write(&blocker, "not a directory").expect("write blocker");
        let options = CliOptions {
            save_path: Some(blocker.join("save.json")),
            ..options()
        };
        let mut session = rich_session();
        let mut events = EventBus::default();
        session.open_packs(1, &mut events).expect("open");

        let saved = execute(&mut session, &mut events, Command::Save, &options);
        assert!(matches!(saved, Ok(false)));
        let reset = execute(&mut session, &mut events, Command::Reset, &options);
        assert!(matches!(reset, Ok(false)));
        assert!(session.state.inventory.is_empty());
        let _ = std::fs::remove_file(blocker);
    }

    #[test]
    fn open_and_sell_all_commands_round_out_the_economy() {
        let mut session = rich_session();
        let mut events = EventBus::default();
        let options = options();
        assert!(execute(&mut session, &mut events, Command::Open(2), &options).expect("open"));
        assert_eq!(session.state.progress.currency, 900);
        let value = session.inventory_value();
        assert!(execute(
            &mut session,
            &mut events,
            Command::Sell(Some(Target::All)),
            &options
        )
        .expect("sell"));
        assert!(session.state.inventory.is_empty());
        assert_eq!(session.state.progress.currency, 900 + value);
    }

    #[test]
    fn declines_do_not_count_as_mutations() {
        let mut session = Session::new(EconomyConfig::default(), RngState::from_seed(3));
        let mut events = EventBus::default();
        let options = options();
        let changed =
            execute(&mut session, &mut events, Command::Open(3), &options).expect("execute");
        assert!(!changed);
        assert_eq!(session.state.progress.currency, 100);
        assert!(!execute(&mut session, &mut events, Command::Sell(None), &options).expect("sell"));
    }

    #[test]
    fn listing_skills_is_read_only_and_unlock_spends_points() {
        let mut session = rich_session();
        session.state.progress.skill_points = 1;
        let mut events = EventBus::default();
        let options = options();
        assert!(!execute(&mut session, &mut events, Command::Skills, &options).expect("skills"));
        let unlock = Command::Unlock("pack_discount".to_string());
        assert!(execute(&mut session, &mut events, unlock, &options).expect("unlock"));
        assert_eq!(session.state.progress.skill_points, 0);
        assert!(!events.is_empty());
        drain_events(&mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn max_buys_every_affordable_pack() {
        let mut session = rich_session();
        let mut events = EventBus::default();
        execute(&mut session, &mut events, Command::OpenMax, &options()).expect("max");
        assert_eq!(session.state.stats.packs_opened, 20);
        assert_eq!(session.state.progress.currency, 0);
    }
}
