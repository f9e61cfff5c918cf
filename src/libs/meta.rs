use crate::libs::error::OgrError;
use indexmap::IndexMap;
use std::io::BufRead;

/// Gene and species of a protein.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinMeta {
    pub gene: String,
    pub species: String,
}

/// Protein → gene → species lookup table.
///
/// Accepts `ppid<TAB>gnid<TAB>spid` rows as well as the two-column
/// `ppid<TAB>gnid,spid` form.
#[derive(Debug, Clone, Default)]
pub struct MetaTable {
    proteins: IndexMap<String, ProteinMeta>,
    genes: IndexMap<String, String>,
}

impl MetaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ppid: &str, gnid: &str, spid: &str) -> Result<(), OgrError> {
        let meta = ProteinMeta {
            gene: gnid.to_string(),
            species: spid.to_string(),
        };
        if let Some(prev) = self.proteins.get(ppid) {
            if *prev != meta {
                return Err(OgrError::ConflictingMeta {
                    ppid: ppid.to_string(),
                    first: format!("{},{}", prev.gene, prev.species),
                    second: format!("{},{}", gnid, spid),
                });
            }
            return Ok(());
        }
        if let Some(species) = self.genes.get(gnid) {
            if species != spid {
                return Err(OgrError::ConflictingMeta {
                    ppid: ppid.to_string(),
                    first: format!("{},{}", gnid, species),
                    second: format!("{},{}", gnid, spid),
                });
            }
        }

        self.genes
            .entry(gnid.to_string())
            .or_insert_with(|| spid.to_string());
        self.proteins.insert(ppid.to_string(), meta);
        Ok(())
    }

    pub fn from_reader<R: BufRead>(reader: R) -> anyhow::Result<Self> {
        let mut table = Self::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').map(|s| s.trim()).collect();
            let (ppid, gnid, spid) = match fields.as_slice() {
                [ppid, gnid, spid, ..] => (*ppid, *gnid, *spid),
                [ppid, pair] => match pair.split_once(',') {
                    Some((gnid, spid)) => (*ppid, gnid, spid),
                    None => {
                        return Err(OgrError::malformed(i + 1, &line, "expected gnid,spid").into())
                    }
                },
                _ => {
                    return Err(
                        OgrError::malformed(i + 1, &line, "expected ppid, gnid and spid").into(),
                    )
                }
            };
            if ppid.is_empty() || gnid.is_empty() || spid.is_empty() {
                return Err(OgrError::malformed(i + 1, &line, "empty id").into());
            }

            table.insert(ppid, gnid, spid)?;
        }

        Ok(table)
    }

    pub fn from_file(infile: &str) -> anyhow::Result<Self> {
        let table = Self::from_reader(crate::reader(infile)?)?;
        log::info!(
            "{} proteins of {} genes read from {}",
            table.proteins.len(),
            table.genes.len(),
            infile
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }

    pub fn protein(&self, ppid: &str) -> Result<&ProteinMeta, OgrError> {
        self.proteins
            .get(ppid)
            .ok_or_else(|| OgrError::UnknownProtein(ppid.to_string()))
    }

    pub fn gene_of(&self, ppid: &str) -> Result<&str, OgrError> {
        self.protein(ppid).map(|m| m.gene.as_str())
    }

    pub fn species_of_gene(&self, gnid: &str) -> Result<&str, OgrError> {
        self.genes
            .get(gnid)
            .map(|s| s.as_str())
            .ok_or_else(|| OgrError::UnknownGene(gnid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_formats() {
        let input = "p1\tg1\tX\np2\tg1,X\n\np3\tg2\tY\n";
        let table = MetaTable::from_reader(input.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.gene_of("p2").unwrap(), "g1");
        assert_eq!(table.species_of_gene("g2").unwrap(), "Y");
    }

    #[test]
    fn test_meta_missing() {
        let table = MetaTable::from_reader("p1\tg1\tX\n".as_bytes()).unwrap();
        assert_eq!(
            table.gene_of("p9").unwrap_err(),
            OgrError::UnknownProtein("p9".to_string())
        );
        assert_eq!(
            table.species_of_gene("g9").unwrap_err(),
            OgrError::UnknownGene("g9".to_string())
        );
    }

    #[test]
    fn test_meta_conflict() {
        let mut table = MetaTable::new();
        table.insert("p1", "g1", "X").unwrap();
        table.insert("p1", "g1", "X").unwrap();
        assert!(table.insert("p1", "g2", "X").is_err());
        assert!(table.insert("p2", "g1", "Y").is_err());
    }

    #[test]
    fn test_meta_malformed() {
        let res = MetaTable::from_reader("p1\tg1\n".as_bytes());
        assert!(res.unwrap_err().to_string().contains("line 1"));
    }
}
