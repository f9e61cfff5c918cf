use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

#[test]
fn command_pipeline_protein() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let outdir = temp.path().join("out");

    let mut cmd = Command::cargo_bin("ogr")?;
    cmd.arg("pipeline")
        .arg("tests/ogr/hits.tsv")
        .arg("-d")
        .arg(&outdir)
        .assert()
        .success();

    for name in [
        "graph.tsv",
        "reciprocal.tsv",
        "components.tsv",
        "clusters.tsv",
        "types.tsv",
    ] {
        assert!(outdir.join(name).exists(), "{} missing", name);
    }
    assert!(!outdir.join("reduced.tsv").exists());

    assert_eq!(
        fs::read_to_string(outdir.join("components.tsv"))?,
        "0000:px1,py1,pz1,px2\n"
    );
    // two triangles sharing py1-pz1
    assert_eq!(
        fs::read_to_string(outdir.join("clusters.tsv"))?,
        "0000:0000:px1,py1\tpx1,pz1\tpx2,py1\tpx2,pz1\tpy1,pz1\n"
    );
    assert_eq!(
        fs::read_to_string(outdir.join("types.tsv"))?,
        "type\tclusters\tcomponents\n1\t1\t1\n"
    );

    Ok(())
}

#[test]
fn command_pipeline_reduce() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let outdir = temp.path().join("out");

    let mut cmd = Command::cargo_bin("ogr")?;
    cmd.arg("pipeline")
        .arg("tests/ogr/hits.tsv")
        .arg("--meta")
        .arg("tests/ogr/meta.tsv")
        .arg("--by-gene")
        .arg("--tree")
        .arg("tests/ogr/species.nwk")
        .arg("-d")
        .arg(&outdir)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(outdir.join("graph.tsv"))?,
        "gx\tgy:30,gz:25\ngy\tgx:22.5,gz:25\ngz\tgx:25,gy:25\n"
    );
    assert_eq!(
        fs::read_to_string(outdir.join("reciprocal.tsv"))?,
        fs::read_to_string(outdir.join("graph.tsv"))?
    );
    assert_eq!(
        fs::read_to_string(outdir.join("clusters.tsv"))?,
        fs::read_to_string("tests/ogr/clusters.tsv")?
    );
    assert_eq!(
        fs::read_to_string(outdir.join("reduced.tsv"))?,
        "OGid\tspid\tgnid\tppid\n0000\tZ\tgz\tpz1\n0000\tX\tgx\tpx1\n0000\tY\tgy\tpy1\n"
    );

    Ok(())
}

#[test]
fn command_pipeline_tree_needs_genes() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let outdir = temp.path().join("out");

    let mut cmd = Command::cargo_bin("ogr")?;
    cmd.arg("pipeline")
        .arg("tests/ogr/hits.tsv")
        .arg("--meta")
        .arg("tests/ogr/meta.tsv")
        .arg("--tree")
        .arg("tests/ogr/species.nwk")
        .arg("-d")
        .arg(&outdir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--by-gene"));

    assert!(!outdir.exists());

    Ok(())
}

#[test]
fn command_pipeline_fails_clean() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let outdir = temp.path().join("out");

    let mut cmd = Command::cargo_bin("ogr")?;
    cmd.arg("pipeline")
        .arg("tests/ogr/hits.tsv")
        .arg("--meta")
        .arg("tests/ogr/meta.tsv")
        .arg("--by-gene")
        .arg("--tree")
        .arg("tests/ogr/species_xy.nwk")
        .arg("-d")
        .arg(&outdir)
        .assert()
        .failure();

    // the reduction fails after clustering; no stage output is left behind
    assert!(!outdir.exists());

    Ok(())
}
