// test of the device image codecs
use std::os::unix::fs::FileExt;
use tempfile::tempfile;
use os8kit::img::{dsk,dectape,rk05,Block,BLOCK_WORDS,DiskImage,Rk05Side};
use os8kit::fs::os8::Disk;

fn patterned(seed: usize) -> Block {
    let mut ans: Block = [0;BLOCK_WORDS];
    for i in 0..BLOCK_WORDS {
        ans[i] = ((seed * 311 + i * 7) % 0o10000) as u16;
    }
    ans
}

#[test]
fn dsk_round_trip() {
    let file = tempfile().expect("no temp file");
    let mut img = dsk::Dsk::from_file(file);
    let block = patterned(3);
    img.write_block(5,&block).expect("write failed");
    assert_eq!(img.read_block(5).expect("read failed"),block);
}

#[test]
fn dsk_rejects_junk_on_read() {
    let file = tempfile().expect("no temp file");
    let mut buf = vec![0u8;512];
    buf[0] = 0xff;
    buf[1] = 0xff;
    file.write_all_at(&buf,0).expect("write failed");
    let img = dsk::Dsk::from_file(file);
    assert!(img.read_block(0).is_err());
}

#[test]
fn codecs_reject_junk_words_on_write() {
    let mut block: Block = [0;BLOCK_WORDS];
    block[10] = 0o20000;
    let mut img = dsk::Dsk::from_file(tempfile().expect("no temp file"));
    assert!(img.write_block(0,&block).is_err());
    let mut img = dectape::Dectape::from_file(tempfile().expect("no temp file"));
    assert!(img.write_block(0,&block).is_err());
    let mut img = rk05::Rk05::from_file(tempfile().expect("no temp file"),Rk05Side::A);
    assert!(img.write_block(0,&block).is_err());
}

#[test]
fn dectape_round_trip_and_media_layout() {
    let file = tempfile().expect("no temp file");
    let host = file.try_clone().expect("no clone");
    let mut img = dectape::Dectape::from_file(file);
    let block = patterned(1);
    img.write_block(1,&block).expect("write failed");
    // OS/8 block 1 occupies two 258 byte media blocks starting at 516
    let mut buf = [0u8;2*258];
    host.read_exact_at(&mut buf,516).expect("read failed");
    assert_eq!(buf[256],0);
    assert_eq!(buf[257],0);
    assert_eq!(buf[514],0);
    assert_eq!(buf[515],0);
    // the second media block resumes at word 128
    assert_eq!(u16::from_le_bytes([buf[258],buf[259]]),block[128]);
    assert_eq!(img.read_block(1).expect("read failed"),block);
}

#[test]
fn rk05_three_for_two_packing() {
    let file = tempfile().expect("no temp file");
    let host = file.try_clone().expect("no clone");
    let mut img = rk05::Rk05::from_file(file,Rk05Side::A);
    let mut block: Block = [0;BLOCK_WORDS];
    block[0] = 0o1234;
    block[1] = 0o5670;
    img.write_block(0,&block).expect("write failed");
    let mut buf = [0u8;3];
    host.read_exact_at(&mut buf,0).expect("read failed");
    assert_eq!(buf,[0x29,0xcb,0xb8]);
    assert_eq!(img.read_block(0).expect("read failed"),block);
}

#[test]
fn rk05_sides_are_independent() {
    let file = tempfile().expect("no temp file");
    let mut side_a = rk05::Rk05::from_file(file.try_clone().expect("no clone"),Rk05Side::A);
    let mut side_b = rk05::Rk05::from_file(file.try_clone().expect("no clone"),Rk05Side::B);
    let block_a = patterned(11);
    let block_b = patterned(13);
    side_a.write_block(100,&block_a).expect("write failed");
    side_b.write_block(100,&block_b).expect("write failed");
    assert_eq!(side_a.read_block(100).expect("read failed"),block_a);
    assert_eq!(side_b.read_block(100).expect("read failed"),block_b);
    // side B block 100 lands a platter past side A block 100
    let mut buf = [0u8;3];
    host_read(&file,(3248 + 100) * 384,&mut buf);
    let mut expect = [0u8;3];
    let (w1,w2) = (block_b[0],block_b[1]);
    expect[0] = (w1 >> 4) as u8;
    expect[1] = (((w1 & 0o17) << 4) | (w2 >> 8)) as u8;
    expect[2] = (w2 & 0o377) as u8;
    assert_eq!(buf,expect);
}

fn host_read(file: &std::fs::File,offset: usize,buf: &mut [u8]) {
    file.read_exact_at(buf,offset as u64).expect("read failed");
}

#[test]
fn rk05_create_side_b_leaves_side_a_intact() {
    let file = tempfile().expect("no temp file");
    let mut disk_a = Disk::from_img(Box::new(rk05::Rk05::from_file(file.try_clone().expect("no clone"),Rk05Side::A)));
    disk_a.create().expect("create A failed");
    let mut before = vec![0u8;3248*384];
    file.read_exact_at(&mut before,0).expect("read failed");
    let mut disk_b = Disk::from_img(Box::new(rk05::Rk05::from_file(file.try_clone().expect("no clone"),Rk05Side::B)));
    disk_b.create().expect("create B failed");
    let mut after = vec![0u8;3248*384];
    file.read_exact_at(&mut after,0).expect("read failed");
    assert_eq!(before,after);
    // both platters read back as valid, independent directories
    disk_a.read_directory().expect("side A directory");
    disk_b.read_directory().expect("side B directory");
}

#[test]
fn out_of_range_blocks_are_refused() {
    let mut img = dsk::Dsk::from_file(tempfile().expect("no temp file"));
    assert!(img.write_block(737,&[0;BLOCK_WORDS]).is_err());
    assert!(img.read_block(737).is_err());
    let img = rk05::Rk05::from_file(tempfile().expect("no temp file"),Rk05Side::B);
    assert!(img.read_block(3248).is_err());
}
