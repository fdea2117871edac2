//! Tags — operator-defined labels attached to leads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
  pub id:         Uuid,
  /// Unique per store, case-sensitive.
  pub name:       String,
  /// Display color as a `#RRGGBB` hex string.
  pub color:      String,
  pub created_at: DateTime<Utc>,
}

/// Colour applied when a tag is created without one.
pub const DEFAULT_COLOR: &str = "#3B82F6";

fn default_color() -> String {
  DEFAULT_COLOR.to_owned()
}

/// Input to [`crate::store::LeadStore::create_tag`] and
/// [`crate::store::LeadStore::update_tag`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTag {
  pub name:  String,
  #[serde(default = "default_color")]
  pub color: String,
}

impl NewTag {
  pub fn validate(&self) -> Result<()> {
    let name = self.name.trim();
    if name.is_empty() || name.len() > 100 {
      return Err(Error::InvalidTagName);
    }
    validate_color(&self.color)?;
    Ok(())
  }
}

fn validate_color(color: &str) -> Result<()> {
  let ok = color.len() == 7
    && color.starts_with('#')
    && color[1..].chars().all(|c| c.is_ascii_hexdigit());
  if !ok {
    return Err(Error::InvalidTagColor(color.to_owned()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tag(name: &str, color: &str) -> NewTag {
    NewTag { name: name.into(), color: color.into() }
  }

  #[test]
  fn accepts_well_formed_tags() {
    assert!(tag("hot", "#FF0000").validate().is_ok());
    assert!(tag("warm-follow-up", "#00ff7f").validate().is_ok());
  }

  #[test]
  fn rejects_bad_names() {
    assert!(matches!(
      tag("", "#FF0000").validate(),
      Err(Error::InvalidTagName)
    ));
    assert!(matches!(
      tag(&"x".repeat(101), "#FF0000").validate(),
      Err(Error::InvalidTagName)
    ));
  }

  #[test]
  fn rejects_bad_colors() {
    for bad in ["FF0000", "#FF00", "#GG0000", "#ff00000", "red"] {
      assert!(matches!(
        tag("ok", bad).validate(),
        Err(Error::InvalidTagColor(_))
      ));
    }
  }
}
