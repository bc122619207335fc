//! Text and JSON rendering of a loaded server list.

use std::fmt::Write;

use server_list::{ContinentEntry, ServerListModel};

/// What to include in the output.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// List individual servers under each country
    pub show_servers: bool,
    /// Only this continent (code or name, case-insensitive)
    pub continent: Option<String>,
}

/// Continents selected by `options`, in model order.
pub fn select<'a>(model: &'a ServerListModel, options: &RenderOptions) -> Vec<&'a ContinentEntry> {
    model
        .continents()
        .iter()
        .filter(|continent| match &options.continent {
            Some(wanted) => {
                continent.code.eq_ignore_ascii_case(wanted) || continent.name.eq_ignore_ascii_case(wanted)
            }
            None => true,
        })
        .collect()
}

pub fn render_text(model: &ServerListModel, options: &RenderOptions) -> String {
    let mut out = String::new();

    for continent in select(model, options) {
        let _ = writeln!(
            out,
            "{} [{}] ({} servers)",
            continent.name,
            continent.code,
            continent.server_count()
        );

        for country in &continent.countries {
            let _ = writeln!(
                out,
                "  {} [{}] ({} servers)",
                country.name,
                country.code,
                country.server_count()
            );

            if options.show_servers {
                for server in &country.servers {
                    let _ = write!(out, "    {} - {}", server.name, server.endpoint());
                    if let Some(url) = &server.url {
                        let _ = write!(out, " <{}>", url);
                    }
                    out.push('\n');
                }
            }
        }
    }

    out
}

pub fn render_json(model: &ServerListModel, options: &RenderOptions) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&select(model, options))
}
