use crate::libs::error::OgrError;
use regex::Regex;
use std::io::BufRead;

/// One pairwise alignment hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub query: String,
    pub subject: String,
    /// Bitscore or any other non-negative similarity
    pub score: f64,
    /// Read when an evalue column is configured; see `GraphBuilder::max_evalue`
    pub evalue: Option<f64>,
    /// Aligned fraction of the query, when the columns are available
    pub coverage: Option<f64>,
}

impl Hit {
    pub fn new(query: &str, subject: &str, score: f64) -> Self {
        Self {
            query: query.to_string(),
            subject: subject.to_string(),
            score,
            evalue: None,
            coverage: None,
        }
    }

    pub fn is_self_hit(&self) -> bool {
        self.query == self.subject
    }
}

/// Column layout of a tab-separated hits file. Indices are 0-based.
#[derive(Debug, Clone)]
pub struct HitFormat {
    pub query: usize,
    pub subject: usize,
    pub score: usize,
    pub evalue: Option<usize>,
    /// Query length column
    pub qlen: Option<usize>,
    /// Aligned query length column
    pub qaln: Option<usize>,
    /// First non-comment line is a header
    pub header: bool,
    /// Extracts the id from the query/subject fields with its first group
    pub id_regex: Option<Regex>,
}

impl Default for HitFormat {
    fn default() -> Self {
        Self {
            query: 0,
            subject: 1,
            score: 2,
            evalue: None,
            qlen: None,
            qaln: None,
            header: false,
            id_regex: None,
        }
    }
}

impl HitFormat {
    /// Layout of `blastp -outfmt 6`
    pub fn blast6() -> Self {
        Self {
            score: 11,
            evalue: Some(10),
            ..Default::default()
        }
    }

    fn extract_id<'a>(&self, field: &'a str, line: usize, row: &str) -> Result<&'a str, OgrError> {
        match &self.id_regex {
            None => Ok(field),
            Some(re) => re
                .captures(field)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .ok_or_else(|| {
                    OgrError::malformed(line, row, format!("`{}` does not match {}", field, re))
                }),
        }
    }

    /// Parse one row. `line` is 1-based and only used in error messages.
    ///
    /// ```
    /// use ogr::libs::hit::HitFormat;
    /// let fmt = HitFormat::default();
    /// let hit = fmt.parse_row("p1\tp3\t50", 1).unwrap();
    /// assert_eq!(hit.query, "p1");
    /// assert_eq!(hit.subject, "p3");
    /// assert_eq!(hit.score, 50.0);
    ///
    /// assert!(fmt.parse_row("p1\tp3", 2).is_err());
    /// assert!(fmt.parse_row("p1\tp3\tNA", 3).is_err());
    /// ```
    pub fn parse_row(&self, row: &str, line: usize) -> Result<Hit, OgrError> {
        let fields: Vec<&str> = row.split('\t').collect();
        let field = |idx: usize, name: &'static str| column(&fields, idx, name, line, row);
        let number = |idx: usize, name: &'static str| {
            let s = column(&fields, idx, name, line, row)?;
            s.parse::<f64>().map_err(|_| {
                OgrError::malformed(line, row, format!("{} `{}` is not a number", name, s))
            })
        };

        let query = self.extract_id(field(self.query, "query")?, line, row)?;
        let subject = self.extract_id(field(self.subject, "subject")?, line, row)?;

        let score = number(self.score, "score")?;
        if !(score >= 0.0) {
            return Err(OgrError::malformed(line, row, "score must be non-negative"));
        }

        let evalue = match self.evalue {
            Some(idx) => Some(number(idx, "evalue")?),
            None => None,
        };

        let coverage = match (self.qlen, self.qaln) {
            (Some(l), Some(a)) => {
                let qlen = number(l, "query length")?;
                let qaln = number(a, "aligned length")?;
                if qlen <= 0.0 {
                    return Err(OgrError::malformed(line, row, "query length must be positive"));
                }
                Some(qaln / qlen)
            }
            _ => None,
        };

        Ok(Hit {
            query: query.to_string(),
            subject: subject.to_string(),
            score,
            evalue,
            coverage,
        })
    }

    /// Read every hit of a reader, skipping blank lines and `#` comments.
    /// The first malformed row aborts the whole read.
    pub fn read_hits<R: BufRead>(&self, reader: R) -> anyhow::Result<Vec<Hit>> {
        let mut hits = vec![];
        let mut header_seen = !self.header;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            if !header_seen {
                header_seen = true;
                continue;
            }
            hits.push(self.parse_row(&line, i + 1)?);
        }

        Ok(hits)
    }
}

fn column<'r>(
    fields: &[&'r str],
    idx: usize,
    name: &str,
    line: usize,
    row: &str,
) -> Result<&'r str, OgrError> {
    fields
        .get(idx)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| OgrError::malformed(line, row, format!("missing {} in column {}", name, idx + 1)))
}

/// Read hits from a file (or `stdin`).
pub fn read_hits(infile: &str, format: &HitFormat) -> anyhow::Result<Vec<Hit>> {
    let reader = crate::reader(infile)?;
    let hits = format.read_hits(reader)?;
    log::info!("{} hits read from {}", hits.len(), infile);
    Ok(hits)
}
