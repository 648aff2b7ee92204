use lambda_rs::matches::{AlignStats, AlignmentMatch};
use lambda_rs::tabular::{
    Column, ColumnSelection, STD_COLUMNS, format_bitscore, format_evalue, format_row,
    group_comments,
};
use lambda_rs::{BlastProgram, ConfigError, EncodeContext, MatchError, OutputConfig, SeqDb};

fn dbs() -> (SeqDb, SeqDb) {
    let queries = SeqDb::from_records([("q1", b"ACGTACGTAC".as_slice())], false).unwrap();
    let subjects = SeqDb::from_records([("s1 chromosome", [b'A'; 50].as_slice())], false).unwrap();
    (queries, subjects)
}

fn sample_match() -> AlignmentMatch {
    AlignmentMatch {
        q_id: "q1".into(),
        s_id: "s1".into(),
        q_start: 2,
        q_end: 8,
        s_start: 4,
        s_end: 11,
        q_frame_shift: 1,
        s_frame_shift: 1,
        e_value: 1e-3,
        bit_score: 12.0,
        raw_score: 6,
        stats: AlignStats {
            alignment_length: 7,
            num_matches: 6,
            num_positive: 6,
            num_mismatches: 0,
            num_gap_opens: 1,
            num_gaps: 1,
        },
        query_row: b"GTA-CGT".to_vec(),
        subject_row: b"GTAACGT".to_vec(),
    }
}

#[test]
fn std_row() {
    let (q, s) = dbs();
    let config = OutputConfig::default();
    let ctx = EncodeContext {
        config: &config,
        queries: &q,
        subjects: &s,
    };
    let row = format_row(&sample_match(), &ctx).unwrap();
    assert_eq!(row, "q1\ts1\t85.71\t7\t0\t1\t3\t8\t5\t11\t0.001\t12.0");
}

#[test]
fn extra_columns() {
    let (q, s) = dbs();
    let config = OutputConfig {
        columns: ColumnSelection::parse("qseqid qlen slen frames sstrand qseq sseq score").unwrap(),
        ..OutputConfig::default()
    };
    let ctx = EncodeContext {
        config: &config,
        queries: &q,
        subjects: &s,
    };
    let row = format_row(&sample_match(), &ctx).unwrap();
    assert_eq!(row, "q1\t10\t50\t1/1\tplus\tGTA-CGT\tGTAACGT\t6");
}

#[test]
fn minus_strand_reports_start_after_end() {
    let (q, s) = dbs();
    let config = OutputConfig {
        columns: ColumnSelection::parse("qstart qend sstrand").unwrap(),
        ..OutputConfig::default()
    };
    let ctx = EncodeContext {
        config: &config,
        queries: &q,
        subjects: &s,
    };
    let mut m = sample_match();
    m.q_frame_shift = -1;
    let row = format_row(&m, &ctx).unwrap();
    assert_eq!(row, "8\t3\tminus");
}

#[test]
fn translated_query_positions() {
    let queries = SeqDb::from_records([("q1", b"ATGGCCAAATTTGGG".as_slice())], false).unwrap();
    let subjects = SeqDb::from_records([("s1", [b'M'; 20].as_slice())], false).unwrap();
    let config = OutputConfig {
        program: BlastProgram::Blastx,
        columns: ColumnSelection::parse("qstart qend sstart send sstrand").unwrap(),
        ..OutputConfig::default()
    };
    let ctx = EncodeContext {
        config: &config,
        queries: &queries,
        subjects: &subjects,
    };
    let mut m = sample_match();
    m.q_start = 1;
    m.q_end = 4;
    m.s_start = 0;
    m.s_end = 3;
    m.s_frame_shift = 0;
    let row = format_row(&m, &ctx).unwrap();
    assert_eq!(row, "4\t12\t1\t3\tN/A");
}

#[test]
fn unknown_query_is_reported() {
    let (q, s) = dbs();
    let config = OutputConfig::default();
    let ctx = EncodeContext {
        config: &config,
        queries: &q,
        subjects: &s,
    };
    let mut m = sample_match();
    m.q_id = "missing".into();
    assert_eq!(
        format_row(&m, &ctx).unwrap_err(),
        MatchError::UnknownQuery("missing".into())
    );
}

#[test]
fn evalue_formatting() {
    assert_eq!(format_evalue(0.0), "0.0");
    assert_eq!(format_evalue(2e-10), "2e-10");
    assert_eq!(format_evalue(3e-5), "3e-05");
    assert_eq!(format_evalue(4e-120), "4e-120");
    assert_eq!(format_evalue(0.05), "0.050");
    assert_eq!(format_evalue(0.5), "0.50");
    assert_eq!(format_evalue(5.0), "5.0");
    assert_eq!(format_evalue(123.0), "123");
}

#[test]
fn bitscore_formatting() {
    assert_eq!(format_bitscore(48.3), "48.3");
    assert_eq!(format_bitscore(150.4), "150");
    assert_eq!(format_bitscore(12345.6), "1.235e+04");
}

#[test]
fn std_expands_in_place() {
    let selection = ColumnSelection::parse("qlen std slen").unwrap();
    let columns = selection.columns();
    assert_eq!(columns.len(), 14);
    assert_eq!(columns[0], Column::QueryLength);
    assert_eq!(&columns[1..13], &STD_COLUMNS);
    assert_eq!(columns[13], Column::SubjectLength);
}

#[test]
fn empty_selection_is_std() {
    assert_eq!(ColumnSelection::parse("").unwrap(), ColumnSelection::default());
}

#[test]
fn unsupported_columns_rejected() {
    assert_eq!(
        ColumnSelection::parse("std btop staxids").unwrap_err(),
        ConfigError::UnsupportedField {
            kind: "column",
            names: vec!["btop".into(), "staxids".into()]
        }
    );
    assert!(matches!(
        ColumnSelection::parse("qseqid bogus").unwrap_err(),
        ConfigError::UnknownField { .. }
    ));
}

#[test]
fn comment_block() {
    let columns = ColumnSelection::parse("qseqid sseqid evalue").unwrap();
    let text = group_comments("q1 description", "db.fa", &columns, 2);
    assert_eq!(
        text,
        "# Query: q1 description\n# Database: db.fa\n# Fields: query id, subject id, evalue\n# 2 hits found\n"
    );

    let empty = group_comments("q2", "db.fa", &columns, 0);
    assert_eq!(empty, "# Query: q2\n# Database: db.fa\n# 0 hits found\n");
}
