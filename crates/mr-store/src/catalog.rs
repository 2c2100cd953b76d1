//! Catalog loading: an enriched `movies.json` when present, otherwise the
//! raw Letterboxd CSV exports, plus optional hand-curation overrides from
//! `overrides.toml`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use mr_core::{Film, Flags, VibeMix};

use crate::error::{Result, StoreError};

/// Load the film catalog from `dir`, best source first:
///
/// 1. `movies.json` — fully enriched records
/// 2. `data/movies.csv` — enriched CSV (chaos, vibe, flags columns)
/// 3. `data/watchlist.csv` — bare Letterboxd export (title/year/uri only)
///
/// In every case `overrides.toml` (if present) is applied on top.
pub fn load_catalog(dir: &Path) -> Result<Vec<Film>> {
    let mut films = load_base(dir)?;
    apply_overrides(dir, &mut films)?;
    tracing::debug!(count = films.len(), "catalog loaded");
    Ok(films)
}

fn load_base(dir: &Path) -> Result<Vec<Film>> {
    let json_path = dir.join("movies.json");
    if json_path.is_file() {
        let raw = fs::read_to_string(&json_path)?;
        return Ok(serde_json::from_str(&raw)?);
    }

    for name in ["data/movies.csv", "data/watchlist.csv"] {
        let path = dir.join(name);
        if path.is_file() {
            let raw = fs::read_to_string(&path)?;
            return parse_csv(&raw);
        }
    }

    Err(StoreError::InvalidData(
        "no movies.json or CSV catalog found".to_string(),
    ))
}

/// Parse a CSV/TSV export. The delimiter is sniffed from the header row,
/// and columns are matched by name so enriched and bare exports share one
/// path.
fn parse_csv(raw: &str) -> Result<Vec<Film>> {
    let mut lines = raw.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| StoreError::InvalidData("empty catalog file".to_string()))?;

    let delim = if header.contains('\t') { '\t' } else { ',' };
    let columns: Vec<String> = split_row(header, delim)
        .into_iter()
        .map(|c| c.trim().to_ascii_lowercase())
        .collect();

    let find = |names: &[&str]| -> Option<usize> {
        columns
            .iter()
            .position(|c| names.contains(&c.as_str()))
    };

    let col_title = find(&["name", "title"]).ok_or_else(|| {
        StoreError::InvalidData("catalog is missing a name/title column".to_string())
    })?;
    let col_year = find(&["year"]);
    let col_link = find(&["letterboxd uri", "uri", "link"]);
    let col_tagline = find(&["tagline"]);
    let col_runtime = find(&["runtime"]);
    let col_poster = find(&["poster"]);
    let col_chaos = find(&["chaos"]);
    let col_cursed = find(&["cursed"]);
    let col_spooky = find(&["spooky"]);
    let col_cozy = find(&["cozy"]);
    let col_flags = find(&["flags", "tags"]);

    let mut films = Vec::new();
    for line in lines {
        let fields = split_row(line, delim);
        let get = |idx: Option<usize>| -> &str {
            idx.and_then(|i| fields.get(i))
                .map(|s| s.trim())
                .unwrap_or("")
        };

        let title = get(Some(col_title));
        if title.is_empty() {
            continue;
        }

        // Some exports carry full dates in the year column; keep the year.
        let year = match get(col_year) {
            "" => None,
            y if y.len() > 4 => Some(y[..4].to_string()),
            y => Some(y.to_string()),
        };

        let vibe = match (get(col_cursed), get(col_spooky), get(col_cozy)) {
            ("", "", "") => None,
            (cursed, spooky, cozy) => Some(VibeMix::new(
                cursed.parse().unwrap_or(0.0),
                spooky.parse().unwrap_or(0.0),
                cozy.parse().unwrap_or(0.0),
            )),
        };

        films.push(Film {
            title: title.to_string(),
            year,
            link: get(col_link).to_string(),
            tagline: get(col_tagline).to_string(),
            runtime: get(col_runtime).parse().ok(),
            poster: match get(col_poster) {
                "" => None,
                p => Some(p.to_string()),
            },
            chaos: get(col_chaos).parse().ok(),
            vibe,
            flags: coerce_flags(get(col_flags)),
        });
    }

    Ok(films)
}

/// Split one CSV row on `delim`, honoring double-quoted fields (with `""`
/// escapes) so titles containing the delimiter survive.
fn split_row(line: &str, delim: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => in_quotes = !in_quotes,
            c if c == delim && !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Turn a free-form flag cell (`"gore, witchy"`, `"neon folk"`) into flags.
/// Unknown tokens are ignored rather than rejected.
fn coerce_flags(cell: &str) -> Flags {
    static SEP: OnceLock<Regex> = OnceLock::new();
    let sep = SEP.get_or_init(|| Regex::new(r"[,\s]+").unwrap());

    let tokens: Vec<String> = sep
        .split(cell)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    Flags::from_tokens(tokens.iter().map(String::as_str))
}

/// One entry in `overrides.toml`, keyed by the film's identity key:
///
/// ```toml
/// ["Zardoz::1974"]
/// chaos = 88
/// tagline = "Sean Connery in a red nappy"
/// flags = ["neon"]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CurationOverride {
    chaos: Option<f64>,
    tagline: Option<String>,
    #[serde(default)]
    flags: Vec<String>,
    vibe: Option<VibeMix>,
}

fn apply_overrides(dir: &Path, films: &mut [Film]) -> Result<()> {
    let path = dir.join("overrides.toml");
    if !path.is_file() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    let overrides: HashMap<String, CurationOverride> = toml::from_str(&raw)?;

    let mut applied = 0usize;
    for film in films.iter_mut() {
        let Some(over) = overrides.get(&film.identity_key()) else {
            continue;
        };
        if let Some(chaos) = over.chaos {
            film.chaos = Some(chaos);
        }
        if let Some(tagline) = &over.tagline {
            film.tagline = tagline.clone();
        }
        if let Some(vibe) = over.vibe {
            film.vibe = Some(vibe);
        }
        // Overrides add flags but never clear ones the data already set.
        film.flags
            .merge(Flags::from_tokens(over.flags.iter().map(String::as_str)));
        applied += 1;
    }
    tracing::debug!(applied, "curation overrides applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_load_json_catalog() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "movies.json",
            r#"[{"title":"Hausu","year":"1977","chaos":92.0,
                "flags":{"theme_witchy":true}}]"#,
        );

        let films = load_catalog(dir.path()).unwrap();
        assert_eq!(films.len(), 1);
        assert_eq!(films[0].identity_key(), "Hausu::1977");
        assert_eq!(films[0].chaos, Some(92.0));
        assert!(films[0].flags.theme_witchy);
    }

    #[test]
    fn test_json_preferred_over_csv() {
        let dir = TempDir::new().unwrap();
        write(&dir, "movies.json", r#"[{"title":"From JSON"}]"#);
        write(&dir, "data/movies.csv", "Name,Year\nFrom CSV,1999\n");

        let films = load_catalog(dir.path()).unwrap();
        assert_eq!(films[0].title, "From JSON");
    }

    #[test]
    fn test_bare_watchlist_csv() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "data/watchlist.csv",
            "Date,Name,Year,Letterboxd URI\n\
             2022-01-01,\"Crimes of the Future\",2022,https://boxd.it/x\n\
             2022-01-02,Ghostwatch,,https://boxd.it/y\n",
        );

        let films = load_catalog(dir.path()).unwrap();
        assert_eq!(films.len(), 2);
        assert_eq!(films[0].title, "Crimes of the Future");
        assert_eq!(films[0].year.as_deref(), Some("2022"));
        assert_eq!(films[0].link, "https://boxd.it/x");
        assert_eq!(films[0].chaos, None);
        assert_eq!(films[1].year, None);
    }

    #[test]
    fn test_enriched_csv_with_flags_and_vibe() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "data/movies.csv",
            "Name,Year,Chaos,Cursed,Spooky,Cozy,Flags\n\
             Suspiria,1977,70,40,55,5,\"witchy, gore\"\n\
             Paddington,2014,5,,,,\n",
        );

        let films = load_catalog(dir.path()).unwrap();
        assert_eq!(films[0].chaos, Some(70.0));
        assert_eq!(films[0].vibe, Some(VibeMix::new(40.0, 55.0, 5.0)));
        assert!(films[0].flags.theme_witchy);
        assert!(films[0].flags.extreme_gore);
        assert_eq!(films[1].vibe, None);
    }

    #[test]
    fn test_tab_delimited_export() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "data/watchlist.csv",
            "Name\tYear\tLetterboxd URI\nPossession\t1981\thttps://boxd.it/z\n",
        );

        let films = load_catalog(dir.path()).unwrap();
        assert_eq!(films[0].identity_key(), "Possession::1981");
    }

    #[test]
    fn test_quoted_field_with_comma_and_escaped_quote() {
        let row = split_row(r#""Yes, Madam!",1985,"The ""best"" one""#, ',');
        assert_eq!(row, vec!["Yes, Madam!", "1985", r#"The "best" one"#]);
    }

    #[test]
    fn test_year_truncated_from_full_date() {
        let dir = TempDir::new().unwrap();
        write(&dir, "data/watchlist.csv", "Name,Year\nOpera,1987-12-19\n");
        let films = load_catalog(dir.path()).unwrap();
        assert_eq!(films[0].year.as_deref(), Some("1987"));
    }

    #[test]
    fn test_missing_catalog_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load_catalog(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn test_overrides_applied_on_top() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "movies.json",
            r#"[{"title":"Zardoz","year":"1974","chaos":50.0}]"#,
        );
        write(
            &dir,
            "overrides.toml",
            "[\"Zardoz::1974\"]\nchaos = 88.0\nflags = [\"neon\"]\n",
        );

        let films = load_catalog(dir.path()).unwrap();
        assert_eq!(films[0].chaos, Some(88.0));
        assert!(films[0].flags.theme_neon);
    }

    #[test]
    fn test_override_flags_merge_additively() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "movies.json",
            r#"[{"title":"Suspiria","year":"1977","flags":{"theme_witchy":true}}]"#,
        );
        write(
            &dir,
            "overrides.toml",
            "[\"Suspiria::1977\"]\nflags = [\"gore\"]\n",
        );

        let films = load_catalog(dir.path()).unwrap();
        assert!(films[0].flags.theme_witchy);
        assert!(films[0].flags.extreme_gore);
    }

    #[test]
    fn test_coerce_flags_mixed_separators() {
        let flags = coerce_flags("gore,  witchy folk\tneon");
        assert!(flags.extreme_gore);
        assert!(flags.theme_witchy);
        assert!(flags.theme_folk);
        assert!(flags.theme_neon);
    }
}
