//! Builders for synthetic Jazelle files.
#![allow(dead_code)]

use jazelle_reader::BankId;

pub const VMS_EPOCH_OFFSET_MS: i64 = 3_506_716_800_730;
pub const RECORD_HEADER_LEN: usize = 112;
pub const EVENT_HEADER_LEN: usize = 32;
pub const TOC_LEN: usize = 72;

pub const CONTINUES: u16 = 0x1;
pub const CONTINUED: u16 = 0x2;

/// Encodes a normal IEEE single (or zero) as VAX F_floating bytes.
pub fn vax_f32(value: f32) -> [u8; 4] {
    if value == 0.0 {
        return [0; 4];
    }
    let bits = value.to_bits() + 0x0100_0000;
    let high = ((bits >> 16) as u16).to_le_bytes();
    let low = (bits as u16).to_le_bytes();
    [high[0], high[1], low[0], low[1]]
}

/// Encodes a normal IEEE double (or zero) as VAX D_floating bytes.
pub fn vax_f64(value: f64) -> [u8; 8] {
    if value == 0.0 {
        return [0; 8];
    }
    let ieee = value.to_bits();
    let sign = ieee & 0x8000_0000_0000_0000;
    let exponent = (ieee >> 52) & 0x7FF;
    let fraction = ieee & ((1 << 52) - 1);
    let bits = sign | ((exponent - 894) << 55) | (fraction << 3);
    let mut out = [0u8; 8];
    for (i, chunk) in out.chunks_exact_mut(2).enumerate() {
        let word = (bits >> (48 - 16 * i)) as u16;
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    out
}

/// VMS ticks for a Unix timestamp in milliseconds.
pub fn vms_ticks(unix_ms: i64) -> i64 {
    (unix_ms + VMS_EPOCH_OFFSET_MS) * 10_000
}

pub fn text(value: &str, len: usize) -> Vec<u8> {
    let mut out = value.as_bytes().to_vec();
    out.resize(len, b' ');
    out
}

/// One physical record with the given continuation word.
pub fn physical(payload: &[u8], control: u16) -> Vec<u8> {
    let reclen = (payload.len() + 8) as u16;
    let mut out = Vec::with_capacity(payload.len() + 8);
    out.extend_from_slice(&reclen.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(&control.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Splits a logical record payload into physical records of at most `fragment` bytes.
pub fn frame(payload: &[u8], fragment: usize) -> Vec<u8> {
    if payload.is_empty() {
        return physical(payload, 0);
    }
    let chunks: Vec<&[u8]> = payload.chunks(fragment).collect();
    let last = chunks.len() - 1;
    let mut out = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let mut control = 0;
        if i > 0 {
            control |= CONTINUED;
        }
        if i < last {
            control |= CONTINUES;
        }
        out.extend(physical(chunk, control));
    }
    out
}

/// (physical record, offset including the 8-byte header) of a payload position.
pub fn position(pos: usize, fragment: usize) -> (i32, i32) {
    ((pos / fragment) as i32, (pos % fragment + 8) as i32)
}

pub fn file_header(name: &str, created_ms: i64, modified_ms: i64) -> Vec<u8> {
    let mut out = text("JAZELLE", 8);
    out.extend_from_slice(&1i32.to_le_bytes());
    out.extend_from_slice(&vms_ticks(created_ms).to_le_bytes());
    out.extend_from_slice(&vms_ticks(modified_ms).to_le_bytes());
    out.extend_from_slice(&3i32.to_le_bytes());
    out.extend(text(name, 80));
    out
}

/// Entry bytes builder, little-endian.
#[derive(Default, Clone)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn i16(mut self, v: i16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.0.extend_from_slice(&vax_f32(v));
        self
    }

    pub fn f64(mut self, v: f64) -> Self {
        self.0.extend_from_slice(&vax_f64(v));
        self
    }

    pub fn zeros(mut self, n: usize) -> Self {
        self.0.resize(self.0.len() + n, 0);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

/// A PHPSUM entry with the given momentum and charge.
pub fn phpsum(id: i32, p: [f32; 3], charge: f32) -> Vec<u8> {
    Bytes::new()
        .i32(id)
        .f32(p[0])
        .f32(p[1])
        .f32(p[2])
        .f32(0.5)
        .f32(-0.25)
        .f32(2.0)
        .f32(charge)
        .i32(7)
        .build()
}

/// A fixed-size entry: the `id` word followed by zeros.
pub fn zeroed_entry(id: i32, size: usize) -> Vec<u8> {
    Bytes::new().i32(id).zeros(size - 4).build()
}

/// A PHCRID entry; the full hypothesis blocks are written when the control bits ask for them.
pub fn phcrid(id: i32) -> Vec<u8> {
    let mut b = Bytes::new().i32(id).f32(1.5).i16(1).i16(2).i16(3).i16(4);
    for mask in [0x10000, 0x20000] {
        if id & mask != 0 {
            b = b
                .f32(-1.0)
                .f32(-2.0)
                .f32(-3.0)
                .f32(-4.0)
                .f32(-5.0)
                .i16(9)
                .i16(12)
                .i32(3)
                .i16(20)
                .i16(18)
                .i16(2)
                .i16(0);
        } else {
            b = b.i16(-1).i16(0);
        }
    }
    b.build()
}

/// An event record: record header, IJEVHD event header and, for MiniDST, the
/// table of contents and data block.
#[derive(Clone, Debug)]
pub struct EventSpec {
    pub run: i32,
    pub event: i32,
    pub time_ms: i64,
    pub weight: f32,
    pub format: &'static str,
    pub toc_version: f32,
    pub counts: [u32; 17],
    pub data: Vec<u8>,
    /// Bytes appended to the data block without being declared by any count.
    pub trailing: Vec<u8>,
}

impl EventSpec {
    pub fn new(run: i32, event: i32) -> Self {
        Self {
            run,
            event,
            time_ms: 830_000_000_000 + event as i64 * 1000,
            weight: 1.0,
            format: "MINIDST",
            toc_version: 1.0,
            counts: [0; 17],
            data: Bytes::new().i32(run).i32(event).i32(0).i32(0).i32(1).build(),
            trailing: Vec::new(),
        }
    }

    /// Appends a bank. Banks must be added in data block order.
    pub fn bank(mut self, id: BankId, entries: &[Vec<u8>]) -> Self {
        self.counts[id as usize - 1] = entries.len() as u32;
        for entry in entries {
            self.data.extend_from_slice(entry);
        }
        self
    }

    pub fn toc_version(mut self, version: f32) -> Self {
        self.toc_version = version;
        self
    }

    pub fn format(mut self, format: &'static str) -> Self {
        self.format = format;
        self
    }

    /// Declares a count without adding its bytes.
    pub fn count(mut self, id: BankId, count: u32) -> Self {
        self.counts[id as usize - 1] = count;
        self
    }

    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    /// The logical record payload as written with physical records of `fragment` bytes.
    pub fn payload(&self, recno: i32, fragment: usize) -> Vec<u8> {
        let minidst = self.format == "MINIDST";
        let toc_pos = RECORD_HEADER_LEN + EVENT_HEADER_LEN;
        let data_pos = toc_pos + TOC_LEN;
        let datsiz = (self.data.len() + self.trailing.len()) as i32;
        let (tocrec, tocoff) = position(toc_pos, fragment);
        let (datrec, datoff) = position(data_pos, fragment);
        let (_, usroff) = position(RECORD_HEADER_LEN, fragment);

        let mut out = Bytes::new()
            .i32(recno)
            .i32(0)
            .i32(0)
            .i32(0)
            .raw(&text("MINIDST", 8))
            .i32(0)
            .i32(0)
            .raw(&text(self.format, 8))
            .raw(&text("", 8))
            .i32(if minidst { tocrec } else { 0 })
            .i32(if minidst { datrec } else { 0 })
            .i32(if minidst { TOC_LEN as i32 } else { 0 })
            .i32(if minidst { datsiz } else { 0 })
            .i32(if minidst { tocoff } else { 0 })
            .i32(0)
            .i32(0)
            .i32(if minidst { datoff } else { 0 })
            .raw(&text("", 8))
            .raw(&text("IJEVHD", 8))
            .i32(usroff)
            .i32(0)
            .i32(0)
            .i32(0)
            // event header
            .i32(0)
            .i32(self.run)
            .i32(self.event)
            .raw(&vms_ticks(self.time_ms).to_le_bytes())
            .f32(self.weight)
            .i32(2)
            .i32(0x40);

        if minidst {
            out = out.f32(self.toc_version);
            for count in self.counts {
                out = out.i32(count as i32);
            }
            out = out.raw(&self.data).raw(&self.trailing);
        }
        out.build()
    }
}

/// A whole synthetic file.
pub struct JazelleFile {
    pub name: String,
    /// Largest physical record payload.
    pub fragment: usize,
    pub end_marker: bool,
    pub records: Vec<EventSpec>,
}

impl JazelleFile {
    pub fn new(records: Vec<EventSpec>) -> Self {
        Self {
            name: "TEST.JAZELLE".to_string(),
            fragment: 8000,
            end_marker: false,
            records,
        }
    }

    pub fn fragment(mut self, fragment: usize) -> Self {
        self.fragment = fragment;
        self
    }

    pub fn end_marker(mut self) -> Self {
        self.end_marker = true;
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = frame(
            &file_header(&self.name, 820_000_000_000, 830_000_000_000),
            self.fragment,
        );
        for (i, record) in self.records.iter().enumerate() {
            out.extend(frame(&record.payload(i as i32 + 1, self.fragment), self.fragment));
        }
        if self.end_marker {
            out.extend_from_slice(&[0u8; 8]);
        }
        out
    }
}

/// A typical event: two particles, one charged track, one cluster and one CRID entry.
pub fn typical_event(run: i32, event: i32) -> EventSpec {
    EventSpec::new(run, event)
        .bank(
            BankId::Phpsum,
            &[phpsum(1, [1.0, 2.0, 3.0], 1.0), phpsum(2, [-0.5, 0.25, 8.0], -1.0)],
        )
        .bank(BankId::Phchrg, &[zeroed_entry(1, 240)])
        .bank(BankId::Phklus, &[zeroed_entry(2, 100)])
        .bank(BankId::Phcrid, &[phcrid(0x10001)])
}
