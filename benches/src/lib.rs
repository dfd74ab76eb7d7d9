#![feature(test)]

extern crate test;

use dat_parser::{sha256d, target, Block, Bytes};
use sha2::{Digest, Sha256};
use test::{black_box, Bencher};

fn sample_header() -> [u8; 80] {
    let mut header = [0u8; 80];
    header[..4].copy_from_slice(&1i32.to_le_bytes());
    header[72..76].copy_from_slice(&0x1d00ffffu32.to_le_bytes());
    header
}

#[bench]
fn bench_sha256d(b: &mut Bencher) {
    let header = sample_header();
    b.iter(|| {
        black_box(sha256d(&header));
    });
}

#[bench]
fn bench_sha2_crate_double(b: &mut Bencher) {
    let header = sample_header();
    b.iter(|| {
        let first = Sha256::digest(&header);
        let second = Sha256::digest(&first);
        black_box(second);
    });
}

#[bench]
fn bench_target(b: &mut Bencher) {
    b.iter(|| {
        black_box(target(black_box(0x1d00ffff)));
    });
}

#[bench]
fn bench_verify(b: &mut Bencher) {
    let header = sample_header();
    let block = Block::new(&header, &[]);
    b.iter(|| {
        black_box(block.verify());
    });
}

#[bench]
fn bench_peek_u32(b: &mut Bencher) {
    let header = sample_header();
    b.iter(|| {
        let bytes = Bytes::new(black_box(&header));
        black_box(bytes.peek_u32_at(72));
    });
}
