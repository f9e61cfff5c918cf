use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn command_reduce() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogr")?;
    let output = cmd
        .arg("reduce")
        .arg("tests/ogr/clusters.tsv")
        .arg("tests/ogr/hits.tsv")
        .arg("--meta")
        .arg("tests/ogr/meta.tsv")
        .arg("--tree")
        .arg("tests/ogr/species.nwk")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // px1 scores 50 + 40 against py1, px2 only 10 + 5
    assert_eq!(
        stdout,
        "OGid\tspid\tgnid\tppid\n0000\tZ\tgz\tpz1\n0000\tX\tgx\tpx1\n0000\tY\tgy\tpy1\n"
    );

    Ok(())
}

#[test]
fn command_reduce_best() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogr")?;
    let output = cmd
        .arg("reduce")
        .arg("tests/ogr/clusters.tsv")
        .arg("tests/ogr/hits.tsv.gz")
        .arg("--meta")
        .arg("tests/ogr/meta.tsv")
        .arg("--tree")
        .arg("tests/ogr/species.nwk")
        .arg("--policy")
        .arg("best")
        .arg("-p")
        .arg("2")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout.lines().count(), 4);
    assert!(stdout.contains("0000\tX\tgx\tpx1\n"));

    Ok(())
}

#[test]
fn command_reduce_species_not_in_tree() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let output = temp.path().join("reduced.tsv");

    let mut cmd = Command::cargo_bin("ogr")?;
    cmd.arg("reduce")
        .arg("tests/ogr/clusters.tsv")
        .arg("tests/ogr/hits.tsv")
        .arg("--meta")
        .arg("tests/ogr/meta.tsv")
        .arg("--tree")
        .arg("tests/ogr/species_xy.nwk")
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("species Z of gene gz"));

    assert!(!output.exists());

    Ok(())
}

#[test]
fn command_reduce_needs_meta() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogr")?;
    cmd.arg("reduce")
        .arg("tests/ogr/clusters.tsv")
        .arg("tests/ogr/hits.tsv")
        .arg("--tree")
        .arg("tests/ogr/species.nwk")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--meta"));

    Ok(())
}

#[test]
fn command_reduce_bad_tree() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let tree = temp.path().join("bad.nwk");
    std::fs::write(&tree, "((X:1,Y:1):1,Z:2;\n")?;

    let mut cmd = Command::cargo_bin("ogr")?;
    cmd.arg("reduce")
        .arg("tests/ogr/clusters.tsv")
        .arg("tests/ogr/hits.tsv")
        .arg("--meta")
        .arg("tests/ogr/meta.tsv")
        .arg("--tree")
        .arg(&tree)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Newick parse error"));

    Ok(())
}

#[test]
fn command_reduce_duplicate_leaf() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let tree = temp.path().join("dup.nwk");
    std::fs::write(&tree, "((X:1,Y:1):1,(Z:1,X:1):1);\n")?;

    let mut cmd = Command::cargo_bin("ogr")?;
    cmd.arg("reduce")
        .arg("tests/ogr/clusters.tsv")
        .arg("tests/ogr/hits.tsv")
        .arg("--meta")
        .arg("tests/ogr/meta.tsv")
        .arg("--tree")
        .arg(&tree)
        .assert()
        .failure()
        .stderr(predicate::str::contains("leaf X appears more than once"));

    Ok(())
}

#[test]
fn command_reduce_negative_length() -> anyhow::Result<()> {
    let temp = tempfile::TempDir::new()?;
    let tree = temp.path().join("neg.nwk");
    std::fs::write(&tree, "((X:1,Y:-1):1,Z:2);\n")?;

    let mut cmd = Command::cargo_bin("ogr")?;
    cmd.arg("reduce")
        .arg("tests/ogr/clusters.tsv")
        .arg("tests/ogr/hits.tsv")
        .arg("--meta")
        .arg("tests/ogr/meta.tsv")
        .arg("--tree")
        .arg(&tree)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Newick parse error"));

    Ok(())
}
