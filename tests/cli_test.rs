use assert_cmd::Command; // Run programs
use predicates::prelude::*; // Used for writing assertions
use tempfile::tempdir;

/// bytes that survive the 12-bit word check
fn word_stream(len: usize) -> Vec<u8> {
    let mut ans = Vec::new();
    for i in 0..len {
        ans.push(match i % 2 {
            0 => (i % 199) as u8,
            _ => (i / 2 % 16) as u8
        });
    }
    ans
}

#[test]
fn create_then_list() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempdir()?;
    let img = scratch.path().join("new.tu56");
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").assert().success();
    assert_eq!(std::fs::metadata(&img)?.len(),380292);
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--dir")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 Files In 0 Blocks - 730 Free Blocks"));
    Ok(())
}

#[test]
fn create_refuses_to_clobber() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempdir()?;
    let img = scratch.path().join("twice.dsk");
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").assert().failure();
    Ok(())
}

#[test]
fn copy_in_list_copy_out() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempdir()?;
    let img = scratch.path().join("vol.dsk");
    let host = scratch.path().join("data.bn");
    let payload = word_stream(768);
    std::fs::write(&host,&payload)?;
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg(&host).arg("os8:").assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--dir")
        .assert()
        .success()
        .stdout(predicate::str::contains("DATA.BN"))
        .stdout(predicate::str::contains("1 Files In 2 Blocks - 728 Free Blocks"));
    let out = scratch.path().join("out.bn");
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("os8:data.bn").arg(&out).assert().success();
    let returned = std::fs::read(&out)?;
    assert_eq!(returned.len(),1024);
    assert_eq!(&returned[..768],&payload[..]);
    assert!(returned[768..].iter().all(|b| *b == 0));
    Ok(())
}

#[test]
fn quiet_wildcard_delete() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempdir()?;
    let img = scratch.path().join("vol.dsk");
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").assert().success();
    for name in ["foo.pa","foo.bn","bar.pa"] {
        let host = scratch.path().join(name);
        std::fs::write(&host,&word_stream(512))?;
        let mut cmd = Command::cargo_bin("os8kit")?;
        cmd.arg("--os8").arg(&img).arg("--image").arg(&host).arg("os8:").assert().success();
    }
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--delete").arg("os8:foo.*").arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 files deleted"));
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--dir")
        .assert()
        .success()
        .stdout(predicate::str::contains("BAR.PA"))
        .stdout(predicate::str::contains("1 Files In 1 Blocks")
            .and(predicate::str::contains("FOO").not()));
    Ok(())
}

#[test]
fn text_file_prints_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempdir()?;
    let img = scratch.path().join("vol.dsk");
    let host = scratch.path().join("hello.pa");
    std::fs::write(&host,"/ HELLO PROGRAM\nHLT\n")?;
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg(&host).arg("os8:").assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("os8:hello.pa")
        .assert()
        .success()
        .stdout(predicate::str::contains("/ HELLO PROGRAM\nHLT\n"));
    Ok(())
}

#[test]
fn exists_create_is_gated_by_confirmation() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempdir()?;
    let img = scratch.path().join("vol.dsk");
    let host = scratch.path().join("keep.bn");
    std::fs::write(&host,&word_stream(512))?;
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg(&host).arg("os8:").assert().success();
    // declined: the file survives
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").arg("--exists").write_stdin("n\n")
        .assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--dir")
        .assert().success()
        .stdout(predicate::str::contains("KEEP.BN"));
    // confirmed: the directory is fresh again
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").arg("--exists").write_stdin("y\n")
        .assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--dir")
        .assert().success()
        .stdout(predicate::str::contains("0 Files In 0 Blocks - 730 Free Blocks"));
    Ok(())
}

#[test]
fn zero_asks_first() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempdir()?;
    let img = scratch.path().join("vol.dsk");
    let host = scratch.path().join("gone.bn");
    std::fs::write(&host,&word_stream(512))?;
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg(&host).arg("os8:").assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--zero").write_stdin("y\n").assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--dir")
        .assert().success()
        .stdout(predicate::str::contains("0 Files In 0 Blocks - 730 Free Blocks"));
    Ok(())
}

#[test]
fn multi_source_copy_out_needs_a_directory() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempdir()?;
    let img = scratch.path().join("vol.dsk");
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("os8:a.bn").arg("os8:b.bn")
        .arg(scratch.path().join("not-a-dir.bin"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("existing host directory"));
    Ok(())
}

#[test]
fn dir_refuses_host_file_arguments() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempdir()?;
    let img = scratch.path().join("vol.dsk");
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--create").assert().success();
    let mut cmd = Command::cargo_bin("os8kit")?;
    cmd.arg("--os8").arg(&img).arg("--dir").arg("plain-name")
        .assert()
        .failure()
        .stderr(predicate::str::contains("os8 file pattern"));
    Ok(())
}
