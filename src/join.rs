use anyhow::Result;
use polars::prelude::*;

use crate::frame::Frame;

pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl From<JoinKind> for JoinType {
    fn from(kind: JoinKind) -> Self {
        match kind {
            JoinKind::Inner => JoinType::Inner,
            JoinKind::Left => JoinType::Left,
        }
    }
}

/// Joins two frames on equal key columns.
///
/// Output columns are the left columns followed by the right columns without
/// the keys. Non-key column names present on both sides get `_x` / `_y`
/// suffixes. Rows follow left order; a left row with several matches yields
/// one row per match in right order. Null keys match each other. The result
/// index is renumbered from zero.
pub fn merge(left: &Frame, right: &Frame, on: &[&str], kind: JoinKind) -> Result<Frame> {
    left.require_columns(on)?;
    right.require_columns(on)?;

    let shared = left
        .columns()
        .into_iter()
        .filter(|name| !on.contains(&name.as_str()) && right.has_column(name))
        .collect::<Vec<_>>();
    let left_df = with_suffix(left.data(), &shared, LEFT_SUFFIX)?;
    let right_df = with_suffix(right.data(), &shared, RIGHT_SUFFIX)?;

    let keys = on.iter().map(|name| col(*name)).collect::<Vec<_>>();
    let mut args = JoinArgs::new(kind.into());
    args.nulls_equal = true;
    args.maintain_order = MaintainOrderJoin::LeftRight;
    let joined = left_df
        .lazy()
        .join(right_df.lazy(), keys.clone(), keys, args)
        .collect()?;

    tracing::debug!(
        left = left.len(),
        right = right.len(),
        out = joined.height(),
        ?kind,
        "merge"
    );
    Ok(Frame::from_data(joined))
}

fn with_suffix(data: &DataFrame, names: &[String], suffix: &str) -> Result<DataFrame> {
    let mut out = data.clone();
    for name in names {
        out.rename(name, format!("{name}{suffix}").into())?;
    }
    Ok(out)
}
