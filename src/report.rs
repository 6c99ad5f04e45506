use crate::frame::ColumnInfo;
use crate::pipeline::{PipelineSummary, TableSummary};
use crate::reconcile::UniqueContradictions;

/// Input tables whose null counts are printed, in print order.
const NULL_COUNT_TABLES: [&str; 2] = ["appearances", "lineups"];

pub fn print_summary(summary: &PipelineSummary) {
    for table in null_count_tables(&summary.inputs) {
        print_null_counts(table);
    }

    let shapes = summary
        .inputs
        .iter()
        .map(|t| format!("{} {:?}", t.name, t.shape))
        .collect::<Vec<_>>();
    println!("Input shapes: {}", shapes.join(", "));
    println!(
        "Clubs: {} ({} without name)",
        summary.clubs, summary.clubs_without_name
    );

    let rec = &summary.reconcile;
    println!();
    println!("Joined game stats: {:?}", rec.joined_shape);
    print_column_info(&rec.joined_info);
    println!("Backfilled appearance-side names: {}", rec.backfilled_names);
    print_column_info(&rec.backfilled_info);

    println!();
    println!(
        "Number of rows with non-matching dates: {}",
        rec.date_contradictions
    );
    print_contradictions("before normalization", &rec.raw_name_contradictions);
    print_contradictions("after normalization", &rec.normalized_name_contradictions);
    if !rec.sample_pairs.is_empty() {
        println!("Remaining name pairs (lineup | appearance):");
        for (lineup, appearance) in &rec.sample_pairs {
            println!("   - {lineup} | {appearance}");
        }
    }
    println!("Game stats cleaned: {:?}", rec.cleaned_shape);
    match summary.date_span {
        Some((lo, hi)) => println!("Date span: {lo} .. {hi}"),
        None => println!("Date span: n/a"),
    }

    println!();
    println!(
        "Duplicate (player_id, game_id) appearance rows: {}",
        summary.duplicate_appearances
    );

    let players = &summary.players;
    println!(
        "Players: {} rows, {} with appearances, merged {:?}, dropped {}, clean {:?}",
        players.players,
        players.counted_players,
        players.merged_shape,
        players.dropped_rows,
        players.clean_shape
    );

    println!();
    for output in &summary.outputs {
        println!(
            "Wrote {} {:?} sha256={}",
            output.path.display(),
            output.shape,
            output.sha256
        );
    }
}

fn null_count_tables(inputs: &[TableSummary]) -> Vec<&TableSummary> {
    NULL_COUNT_TABLES
        .iter()
        .filter_map(|name| inputs.iter().find(|t| t.name == *name))
        .collect()
}

fn print_null_counts(table: &TableSummary) {
    println!("Null counts: {}", table.name);
    let width = name_width(table.null_counts.iter().map(|(name, _)| name.as_str()));
    for (name, nulls) in &table.null_counts {
        println!("  {name:<width$} {nulls}");
    }
}

fn print_column_info(info: &[ColumnInfo]) {
    let width = name_width(info.iter().map(|c| c.name.as_str()));
    for column in info {
        println!("  {:<width$} {} non-null", column.name, column.non_null);
    }
}

fn print_contradictions(label: &str, unique: &UniqueContradictions) {
    println!(
        "Number of rows with non-matching names ({label}): {}",
        unique.rows
    );
    println!(
        "  unique lineup names {}, unique appearance names {}, unique pairs {}",
        unique.lineup_names, unique.appearance_names, unique.pairs
    );
}

fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &'static str) -> TableSummary {
        TableSummary {
            name,
            shape: (0, 0),
            null_counts: Vec::new(),
        }
    }

    #[test]
    fn appearances_null_counts_print_before_lineups() {
        let inputs = vec![table("players"), table("lineups"), table("appearances")];
        let order = null_count_tables(&inputs)
            .into_iter()
            .map(|t| t.name)
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["appearances", "lineups"]);
    }
}
