// test of host <-> OS/8 file transfer
use tempfile::tempfile;
use os8kit::img::dsk;
use os8kit::fs::os8::Disk;
use os8kit::fs::os8::types::Pattern;

fn fresh_dsk() -> Disk {
    let file = tempfile().expect("no temp file");
    Disk::from_img(Box::new(dsk::Dsk::from_file(file)))
}

/// bytes that survive the 12-bit word check: every odd byte stays below 16
fn word_stream(len: usize,seed: u8) -> Vec<u8> {
    let mut ans = Vec::new();
    for i in 0..len {
        ans.push(match i % 2 {
            0 => (seed as usize + i) as u8,
            _ => (i / 2 % 16) as u8
        });
    }
    ans
}

#[test]
fn image_copy_round_trip() {
    let mut disk = fresh_dsk();
    let mut dir = disk.create().expect("create failed");
    let payload = word_stream(768,5);
    let entry = disk.copy_in(&mut dir,"A.BN",&payload).expect("copy in failed");
    assert_eq!(entry.length(),2);
    let listing = disk.catalog(&dir,&Pattern::compile("*.*").expect("bad pattern"),false,2);
    assert!(listing.contains("A.BN"));
    assert!(listing.contains("1 Files In 2 Blocks - 728 Free Blocks"));
    let back = disk.copy_out(&entry).expect("copy out failed");
    assert_eq!(back.len(),1024);
    assert_eq!(&back[..768],&payload[..]);
    assert!(back[768..].iter().all(|b| *b == 0));
}

#[test]
fn text_copy_round_trip() {
    let mut disk = fresh_dsk();
    let mut dir = disk.create().expect("create failed");
    let text = b"HELLO, WORLD\n\tSECOND LINE\n";
    let entry = disk.copy_in_text(&mut dir,"HELLO.PA",text).expect("copy in failed");
    let back = disk.copy_out_text(&entry).expect("copy out failed");
    assert_eq!(back,text);
}

#[test]
fn text_without_trailing_newline_still_terminates() {
    let mut disk = fresh_dsk();
    let mut dir = disk.create().expect("create failed");
    let entry = disk.copy_in_text(&mut dir,"NOTE.TX",b"NO NEWLINE").expect("copy in failed");
    let back = disk.copy_out_text(&entry).expect("copy out failed");
    assert_eq!(back,b"NO NEWLINE");
}

#[test]
fn wildcard_delete_is_selective() {
    let mut disk = fresh_dsk();
    let mut dir = disk.create().expect("create failed");
    let keeper = word_stream(512,9);
    disk.copy_in(&mut dir,"FOO.PA",&word_stream(512,1)).expect("copy failed");
    disk.copy_in(&mut dir,"FOO.BN",&word_stream(512,2)).expect("copy failed");
    disk.copy_in(&mut dir,"BAR.PA",&keeper).expect("copy failed");
    let patt = Pattern::compile("foo.*").expect("bad pattern");
    assert_eq!(disk.delete_matching(&mut dir,&patt,&mut |_| true),2);
    let survivors = dir.lookup_all(&Pattern::compile("*.*").expect("bad pattern"));
    assert_eq!(survivors.len(),1);
    let back = disk.copy_out(&survivors[0]).expect("copy out failed");
    assert_eq!(back,keeper);
}

#[test]
fn zero_byte_copy_in_is_refused() {
    let mut disk = fresh_dsk();
    let mut dir = disk.create().expect("create failed");
    assert!(disk.copy_in(&mut dir,"E.BN",&[]).is_err());
}

#[test]
fn illegal_names_are_refused() {
    let mut disk = fresh_dsk();
    let mut dir = disk.create().expect("create failed");
    let payload = word_stream(512,1);
    assert!(disk.copy_in(&mut dir,"1BAD.BN",&payload).is_err());
    assert!(disk.copy_in(&mut dir,"TOOLONG.BN",&payload).is_err());
    assert!(disk.copy_in(&mut dir,"BAD*.BN",&payload).is_err());
    assert!(disk.copy_in(&mut dir,"OK.BN",&payload).is_ok());
}
