//! Normalize a raw config from the file into a [`Config`].

use std::path::PathBuf;

use anyhow::{anyhow, bail, Error, Result};

use crate::config::file::RawConfig;
use crate::config::{Config, DEFAULT_TEMPLATE};
use crate::context::Context;
use crate::copy::{HashAlgorithm, DEFAULT_CHUNK_SIZE, DEFAULT_WORKERS};
use crate::engine::template::Template;

/// Normalize a raw config from the file into a [`Config`].
///
/// The only fatal error is a missing output directory; everything else is
/// fixed up with a warning.
pub fn normalize(ctx: &Context, raw: RawConfig, warnings: &mut Vec<Error>) -> Result<Config> {
    let RawConfig {
        output,
        template,
        plugin_dirs,
        hash,
        chunk_size,
        workers,
        rest,
    } = raw;

    for key in rest.keys() {
        warnings.push(anyhow!("unused config key: `{key}`"));
    }

    let output = match output {
        Some(output) => ctx.expand_tilde(PathBuf::from(output)),
        None => bail!("config does not set the `output` directory"),
    };

    let template = Template::parse(template.as_deref().unwrap_or(DEFAULT_TEMPLATE));

    // The default plugin directory is always searched first.
    let mut dirs = vec![ctx.plugin_dir().to_path_buf()];
    for dir in plugin_dirs {
        dirs.push(ctx.expand_tilde(PathBuf::from(dir)));
    }

    let hash = match hash.as_deref() {
        None | Some("") => None,
        Some(name) => match name.parse::<HashAlgorithm>() {
            Ok(algorithm) => Some(algorithm),
            Err(err) => {
                warnings.push(Error::new(err));
                None
            }
        },
    };

    let chunk_size = match chunk_size {
        Some(0) => {
            warnings.push(anyhow!("`chunk_size` must be at least 1, using 1"));
            1
        }
        Some(n) => n,
        None => DEFAULT_CHUNK_SIZE,
    };
    let workers = match workers {
        Some(0) => {
            warnings.push(anyhow!("`workers` must be at least 1, using 1"));
            1
        }
        Some(n) => n,
        None => DEFAULT_WORKERS,
    };

    Ok(Config {
        output,
        template,
        plugin_dirs: dirs,
        hash,
        chunk_size,
        workers,
    })
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////
