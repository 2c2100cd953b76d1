use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;

use mr_core::{
    BanishList, ContentFilters, Film, Mode, Preset, Session, Target, Theme, Variety, VibeMix,
    today_key,
};
use mr_store::{DB_FILE, Store, load_catalog, resolve_data_dir};

#[derive(Parser)]
#[command(name = "mr", about = "Weighted-random film picker for the watchlist")]
struct Cli {
    /// Data directory holding the catalog and session database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Fixed RNG seed for reproducible draws
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deal the next film off the deck
    Deal(PickArgs),

    /// Pick again near the last pick without consuming the deck
    Reroll(PickArgs),

    /// Rule the last pick out for the rest of today and deal a replacement
    Banish(PickArgs),

    /// Undo the most recent banish
    Undo(PickArgs),

    /// Show catalog and session statistics
    Stats(PickArgs),

    /// Clear the deck, the last pick, and today's exclusions
    Reset,
}

/// Taste and filter controls, shared by every deck-touching command.
/// Changing any of them between runs invalidates the checkpointed deck.
#[derive(Args, Clone)]
struct PickArgs {
    /// Taste mode: order, mix, chaos
    #[arg(long, default_value = "mix")]
    mode: String,

    /// Variety band: tight, medium, wide
    #[arg(long, default_value = "tight")]
    variety: String,

    /// Theme filter: witchy, body, folk, found, neon
    #[arg(long)]
    theme: Option<String>,

    /// Hard-filter preset: cozy, midnight, folk
    #[arg(long)]
    preset: Option<String>,

    /// Vibe target as cursed/spooky/cozy percentages, e.g. 60/30/10
    #[arg(long)]
    vibe: Option<String>,

    /// Exclude films flagged for extreme gore
    #[arg(long)]
    no_gore: bool,

    /// Exclude films flagged for sexual violence
    #[arg(long)]
    no_sv: bool,

    /// Exclude films flagged for kids in peril
    #[arg(long)]
    no_kids: bool,
}

/// Everything a persisted setting snapshot covers. Serialized to JSON and
/// compared verbatim; any difference discards the checkpointed deck.
#[derive(Serialize)]
struct SettingsSnapshot {
    mode: Mode,
    variety: Variety,
    theme: Theme,
    preset: Option<Preset>,
    vibe: Option<VibeMix>,
    content: ContentFilters,
    catalog_len: usize,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Deal(args) => cmd_deal(&cli, args),
        Commands::Reroll(args) => cmd_reroll(&cli, args),
        Commands::Banish(args) => cmd_banish(&cli, args),
        Commands::Undo(args) => cmd_undo(&cli, args),
        Commands::Stats(args) => cmd_stats(&cli, args),
        Commands::Reset => cmd_reset(&cli),
    }
}

// ---------------------------------------------------------------------------
// Argument parsing (strict: a typo should fail, not silently default)
// ---------------------------------------------------------------------------

fn parse_mode(s: &str) -> Result<Mode> {
    match s {
        "order" | "mix" | "chaos" => Ok(Mode::from_str_lossy(s)),
        _ => bail!("unknown mode '{s}' (expected order, mix, or chaos)"),
    }
}

fn parse_variety(s: &str) -> Result<Variety> {
    match s.to_ascii_lowercase().as_str() {
        "t" | "tight" | "m" | "medium" | "w" | "wide" => Ok(Variety::from_str_lossy(s)),
        _ => bail!("unknown variety '{s}' (expected tight, medium, or wide)"),
    }
}

fn parse_theme(s: &str) -> Result<Theme> {
    match s {
        "all" | "witch" | "witchy" | "body" | "folk" | "found" | "neon" => {
            Ok(Theme::from_str_lossy(s))
        }
        _ => bail!("unknown theme '{s}' (expected witchy, body, folk, found, or neon)"),
    }
}

fn parse_preset(s: &str) -> Result<Preset> {
    Preset::from_str_lossy(s)
        .ok_or_else(|| anyhow::anyhow!("unknown preset '{s}' (expected cozy, midnight, or folk)"))
}

fn parse_vibe(s: &str) -> Result<VibeMix> {
    let parts: Vec<&str> = s.split('/').collect();
    let [cursed, spooky, cozy] = parts.as_slice() else {
        bail!("vibe must be cursed/spooky/cozy, e.g. 60/30/10");
    };
    let num = |p: &str| -> Result<f64> {
        let v: f64 = p
            .trim()
            .parse()
            .with_context(|| format!("bad vibe component '{p}'"))?;
        if !v.is_finite() || v < 0.0 {
            bail!("vibe components must be non-negative, got '{p}'");
        }
        Ok(v)
    };
    Ok(VibeMix::new(num(cursed)?, num(spooky)?, num(cozy)?))
}

// ---------------------------------------------------------------------------
// Session assembly
// ---------------------------------------------------------------------------

struct Picker {
    session: Session<SmallRng>,
    store: Store,
    fingerprint: String,
}

/// Load the catalog, apply the requested controls, and rehydrate session
/// state from the store so consecutive invocations consume one deck.
fn open_picker(cli: &Cli, args: &PickArgs) -> Result<Picker> {
    let dir = resolve_data_dir(cli.data_dir.clone());
    let films = load_catalog(&dir)
        .with_context(|| format!("failed to load catalog from {}", dir.display()))?;
    if films.is_empty() {
        bail!("no films loaded from {}", dir.display());
    }
    tracing::debug!(count = films.len(), dir = %dir.display(), "catalog loaded");

    let store = Store::open(&dir.join(DB_FILE)).context("failed to open session store")?;

    let mode = parse_mode(&args.mode)?;
    let variety = parse_variety(&args.variety)?;
    let theme = args.theme.as_deref().map(parse_theme).transpose()?;
    let preset = args.preset.as_deref().map(parse_preset).transpose()?;
    let vibe = args.vibe.as_deref().map(parse_vibe).transpose()?;
    let content = ContentFilters {
        no_gore: args.no_gore,
        no_sexual_violence: args.no_sv,
        no_kids_in_peril: args.no_kids,
    };

    let snapshot = SettingsSnapshot {
        mode,
        variety,
        theme: theme.unwrap_or_default(),
        preset,
        vibe,
        content,
        catalog_len: films.len(),
    };
    let fingerprint = serde_json::to_string(&snapshot).context("failed to encode settings")?;

    let rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    let today = today_key();
    let mut session = Session::new(films, &today, rng);
    session.set_mode(mode);
    session.set_variety(variety);
    session.set_theme(theme.unwrap_or_default());
    session.set_preset(preset);
    session.set_content(content);
    if let Some(mix) = vibe {
        session.set_vibe_target(mix);
    }

    // Rehydrate: exclusions first (rebuilds the deck), then the deck
    // checkpoint on top when the settings still match.
    session.restore_banished(store.load_banished()?);
    if let Some(deck) = store.load_deck(&fingerprint)? {
        tracing::debug!(remaining = deck.len(), "restored deck checkpoint");
        session.restore_deck(deck);
    }
    if let Some(key) = store.load_last_pick()? {
        let idx = session
            .films()
            .iter()
            .position(|m| m.identity_key() == key);
        session.restore_last_pick(idx);
    }

    Ok(Picker {
        session,
        store,
        fingerprint,
    })
}

/// Write the session state back so the next invocation picks up where
/// this one left off.
fn save_picker(picker: &Picker) -> Result<()> {
    let Picker {
        session,
        store,
        fingerprint,
    } = picker;
    store.save_banished(session.banished())?;
    store.save_deck(session.deck(), fingerprint)?;
    let last_key = session
        .last_pick()
        .and_then(|i| session.film(i))
        .map(Film::identity_key);
    store.save_last_pick(last_key.as_deref())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn print_card(film: &Film, deck_remaining: usize) {
    match &film.year {
        Some(year) => println!("{} ({year})", film.title),
        None => println!("{}", film.title),
    }
    if let Some(runtime) = film.runtime {
        println!("  runtime: {runtime} min");
    }
    if !film.tagline.is_empty() {
        println!("  tagline: {}", film.tagline);
    }
    match (film.chaos, film.vibe) {
        (Some(chaos), _) => println!("  chaos:   {chaos:.0}"),
        (None, Some(mix)) => {
            let n = mix.normalized();
            println!(
                "  vibe:    {:.0}% cursed / {:.0}% spooky / {:.0}% cozy",
                n.cursed, n.spooky, n.cozy
            );
        }
        (None, None) => println!("  chaos:   unscored"),
    }
    if !film.link.is_empty() {
        println!("  link:    {}", film.link);
    }
    println!("  deck:    {deck_remaining} left");
}

fn cmd_deal(cli: &Cli, args: &PickArgs) -> Result<()> {
    let mut picker = open_picker(cli, args)?;
    let idx = picker
        .session
        .deal_index()
        .context("the catalog is empty")?;
    let remaining = picker.session.deck().len();
    print_card(picker.session.film(idx).context("dealt index out of range")?, remaining);
    save_picker(&picker)
}

fn cmd_reroll(cli: &Cli, args: &PickArgs) -> Result<()> {
    let mut picker = open_picker(cli, args)?;
    let idx = picker
        .session
        .reroll_index()
        .context("the catalog is empty")?;
    let remaining = picker.session.deck().len();
    print_card(picker.session.film(idx).context("rerolled index out of range")?, remaining);
    save_picker(&picker)
}

fn cmd_banish(cli: &Cli, args: &PickArgs) -> Result<()> {
    let mut picker = open_picker(cli, args)?;
    if picker.session.last_pick().is_none() {
        bail!("nothing has been dealt yet — run `mr deal` first");
    }
    let banished_key = picker
        .session
        .last_pick()
        .and_then(|i| picker.session.film(i))
        .map(Film::identity_key)
        .unwrap_or_default();

    let idx = picker
        .session
        .banish_last()
        .context("the catalog is empty")?;
    println!("banished {banished_key} for today");
    let remaining = picker.session.deck().len();
    print_card(picker.session.film(idx).context("dealt index out of range")?, remaining);
    save_picker(&picker)
}

fn cmd_undo(cli: &Cli, args: &PickArgs) -> Result<()> {
    let mut picker = open_picker(cli, args)?;
    match picker.session.undo_banish() {
        Some(key) => println!("restored {key}"),
        None => println!("nothing to undo today"),
    }
    save_picker(&picker)
}

fn cmd_stats(cli: &Cli, args: &PickArgs) -> Result<()> {
    let picker = open_picker(cli, args)?;
    let session = &picker.session;
    let dir = resolve_data_dir(cli.data_dir.clone());

    let scored = session
        .films()
        .iter()
        .filter(|m| m.chaos.is_some() || m.vibe.is_some())
        .count();

    println!("data dir:   {}", dir.display());
    println!("catalog:    {} films ({} scored)", session.films().len(), scored);
    println!("candidates: {}", session.candidate_count());
    println!("deck:       {} cards", session.deck().len());
    println!("banished:   {} today", session.banished().active_ids(session.today()).len());
    match session.target() {
        Target::Chaos(t) => println!("target:     chaos {t:.0}"),
        Target::Vibe(mix) => {
            let n = mix.normalized();
            println!(
                "target:     vibe {:.0}/{:.0}/{:.0}",
                n.cursed, n.spooky, n.cozy
            );
        }
    }
    Ok(())
}

fn cmd_reset(cli: &Cli) -> Result<()> {
    let dir = resolve_data_dir(cli.data_dir.clone());
    let store = Store::open(&dir.join(DB_FILE)).context("failed to open session store")?;

    store.clear_deck()?;
    store.save_banished(&BanishList::empty(&today_key()))?;
    store.save_last_pick(None)?;

    println!("session reset");
    Ok(())
}
