use anyhow::{Context, Result, bail};
use fretlink_core::utils::STRING_COUNT;
use fretlink_core::{FretState, chord_shape};

/// Parses a fret state from a chord name (`Am`) or one fret per string
/// (`0,1,2,2,0,0`).
pub fn parse_frets(text: &str, max_fret: u8) -> Result<FretState> {
    let text = text.trim();
    if text.is_empty() {
        bail!("empty fret state");
    }

    if !text.contains(',') {
        if let Some(shape) = chord_shape(text) {
            return Ok(shape.frets);
        }
        if !text.chars().all(|c| c.is_ascii_digit()) {
            bail!("unknown chord {:?}", text);
        }
    }

    let values = text
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<u8>()
                .with_context(|| format!("invalid fret {:?}", part.trim()))
        })
        .collect::<Result<Vec<_>>>()?;

    let frets: [u8; STRING_COUNT] = values.as_slice().try_into().map_err(|_| {
        anyhow::anyhow!(
            "expected {} frets, got {} in {:?}",
            STRING_COUNT,
            values.len(),
            text
        )
    })?;

    Ok(FretState::new(frets).validate(max_fret)?)
}
