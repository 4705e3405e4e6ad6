use super::{Record, Tangle, TangleError};
use std::convert::TryFrom;
use std::io::BufRead;
use tracing::debug;

const FIELDS_PER_RECORD: usize = 3;
// The declared count is untrusted, so it only bounds the initial allocation.
const MAX_PREALLOCATED_RECORDS: usize = 1 << 16;

impl Tangle {
    /// Reads a ledger in the text format: a transaction count on the first
    /// line followed by one `left right timestamp` line per transaction.
    pub fn parse<R>(reader: R) -> Result<Self, TangleError>
    where
        R: BufRead,
    {
        let records = parse_records(reader)?;
        Self::from_records(&records)
    }
}

pub fn parse_records<R>(mut reader: R) -> Result<Vec<Record>, TangleError>
where
    R: BufRead,
{
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let count_string = line.trim();
    if count_string.is_empty() {
        return Err(TangleError::EmptyInput);
    }
    let count = count_string
        .parse::<i64>()
        .map_err(|err| parse_error(1, err))?;
    if count < 0 {
        return Err(TangleError::NegativeVertexCount(count));
    }
    let count = usize::try_from(count).map_err(|_| TangleError::TooManyVertices(count))?;

    let mut records = Vec::with_capacity(count.min(MAX_PREALLOCATED_RECORDS));
    let mut line_number = 1;
    for _ in 0..count {
        line.clear();
        line_number += 1;
        if reader.read_line(&mut line)? == 0 {
            return Err(TangleError::MissingTransactions {
                expected: count,
                found: records.len(),
            });
        }
        records.push(parse_record(&line, line_number)?);
    }

    // Check to make sure input is finished
    loop {
        line.clear();
        line_number += 1;
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if !line.trim().is_empty() {
            return Err(TangleError::TrailingInput { line: line_number });
        }
    }

    debug!(transactions = records.len(), "parsed ledger");
    Ok(records)
}

fn parse_record(line: &str, line_number: usize) -> Result<Record, TangleError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELDS_PER_RECORD {
        return Err(TangleError::Parse {
            line: line_number,
            reason: format!(
                "expected {} fields, found {}",
                FIELDS_PER_RECORD,
                fields.len()
            ),
        });
    }

    let parse_vertex = |field: &str| {
        field
            .parse::<usize>()
            .map_err(|err| parse_error(line_number, err))
    };
    Ok(Record {
        left: parse_vertex(fields[0])?,
        right: parse_vertex(fields[1])?,
        timestamp: fields[2]
            .parse::<u64>()
            .map_err(|err| parse_error(line_number, err))?,
    })
}

fn parse_error<E: ToString>(line: usize, err: E) -> TangleError {
    TangleError::Parse {
        line,
        reason: err.to_string(),
    }
}
