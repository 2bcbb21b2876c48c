use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io;

use crate::bitmap::container::Container;
use crate::bitmap::store::{ArrayStore, BitmapStore, RunInterval, RunStore, Store, BITMAP_LENGTH};
use crate::RoaringBitmap;

const TYPECODE_BITMAP: u8 = 1;
const TYPECODE_ARRAY: u8 = 2;
const TYPECODE_RUN: u8 = 3;

fn typecode(store: &Store) -> u8 {
    match store {
        Store::Bitmap(_) => TYPECODE_BITMAP,
        Store::Array(_) => TYPECODE_ARRAY,
        Store::Run(_) => TYPECODE_RUN,
    }
}

fn payload_len(store: &Store) -> u32 {
    match store {
        Store::Array(values) => 4 + values.len() as u32 * 2,
        Store::Bitmap(_) => (BITMAP_LENGTH * 8) as u32,
        Store::Run(runs) => 4 + runs.count_runs() as u32 * 4,
    }
}

impl RoaringBitmap {
    /// Returns the size in bytes this bitmap would occupy if serialized with
    /// [`serialize_into`][RoaringBitmap::serialize_into].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring::RoaringBitmap;
    ///
    /// let rb1: RoaringBitmap = (1..4).collect();
    /// let mut bytes = Vec::with_capacity(rb1.serialized_size());
    /// rb1.serialize_into(&mut bytes).unwrap();
    /// let rb2 = RoaringBitmap::deserialize_from(&bytes[..]).unwrap();
    ///
    /// assert_eq!(rb1, rb2);
    /// ```
    pub fn serialized_size(&self) -> usize {
        let directory_bytes = self.containers.len() * (2 + 1);
        let payload_bytes: usize =
            self.containers.iter().map(|c| 4 + payload_len(&c.store) as usize).sum();
        4 + 4 + directory_bytes + payload_bytes
    }

    /// Serializes this bitmap into a self-describing, little-endian format. This is *not* the
    /// CRoaring-compatible wire format used by the official C/C++, Java and Go implementations;
    /// it is a simpler format private to this crate, chosen because nothing outside this crate
    /// needs to read it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring::RoaringBitmap;
    ///
    /// let rb1: RoaringBitmap = (1..4).collect();
    /// let mut bytes = vec![];
    /// rb1.serialize_into(&mut bytes).unwrap();
    /// let rb2 = RoaringBitmap::deserialize_from(&bytes[..]).unwrap();
    ///
    /// assert_eq!(rb1, rb2);
    /// ```
    pub fn serialize_into<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.serialized_size() as u32)?;
        writer.write_u32::<LittleEndian>(self.containers.len() as u32)?;

        for container in &self.containers {
            writer.write_u16::<LittleEndian>(container.key)?;
        }
        for container in &self.containers {
            writer.write_u8(typecode(&container.store))?;
        }

        for container in &self.containers {
            writer.write_u32::<LittleEndian>(payload_len(&container.store))?;
            match &container.store {
                Store::Array(values) => {
                    writer.write_u32::<LittleEndian>(values.len() as u32)?;
                    for &value in values.iter() {
                        writer.write_u16::<LittleEndian>(value)?;
                    }
                }
                Store::Bitmap(bits) => {
                    for &word in bits.as_array() {
                        writer.write_u64::<LittleEndian>(word)?;
                    }
                }
                Store::Run(runs) => {
                    writer.write_u32::<LittleEndian>(runs.count_runs() as u32)?;
                    for run in runs.as_slice() {
                        writer.write_u16::<LittleEndian>(run.start)?;
                        writer.write_u16::<LittleEndian>(run.end - run.start)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Deserializes a bitmap from the format written by
    /// [`serialize_into`][RoaringBitmap::serialize_into]. Every length and ordering invariant is
    /// validated; malformed input returns `io::Error` with `ErrorKind::InvalidData` rather than
    /// constructing a partially-built bitmap.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring::RoaringBitmap;
    ///
    /// let rb1: RoaringBitmap = (1..4).collect();
    /// let mut bytes = vec![];
    /// rb1.serialize_into(&mut bytes).unwrap();
    /// let rb2 = RoaringBitmap::deserialize_from(&bytes[..]).unwrap();
    ///
    /// assert_eq!(rb1, rb2);
    /// ```
    pub fn deserialize_from<R: io::Read>(mut reader: R) -> io::Result<RoaringBitmap> {
        fn invalid(msg: &str) -> io::Error {
            io::Error::new(io::ErrorKind::InvalidData, msg)
        }

        let total_len = reader.read_u32::<LittleEndian>()?;
        let size = reader.read_u32::<LittleEndian>()? as usize;

        let mut keys = Vec::with_capacity(size);
        for _ in 0..size {
            keys.push(reader.read_u16::<LittleEndian>()?);
        }
        if !keys.windows(2).all(|w| w[0] < w[1]) {
            return Err(invalid("directory keys are not strictly ascending"));
        }

        let mut typecodes = Vec::with_capacity(size);
        for _ in 0..size {
            typecodes.push(reader.read_u8()?);
        }

        let mut containers = Vec::with_capacity(size);
        for i in 0..size {
            let declared_payload_len = reader.read_u32::<LittleEndian>()?;

            let store = match typecodes[i] {
                TYPECODE_ARRAY => {
                    let cardinality = reader.read_u32::<LittleEndian>()? as usize;
                    if 4 + cardinality * 2 != declared_payload_len as usize {
                        return Err(invalid("array payload length mismatch"));
                    }
                    let mut values = Vec::with_capacity(cardinality);
                    for _ in 0..cardinality {
                        values.push(reader.read_u16::<LittleEndian>()?);
                    }
                    if !values.windows(2).all(|w| w[0] < w[1]) {
                        return Err(invalid("array store values are not strictly ascending"));
                    }
                    Store::Array(ArrayStore::from_vec_unchecked(values))
                }
                TYPECODE_BITMAP => {
                    if declared_payload_len as usize != BITMAP_LENGTH * 8 {
                        return Err(invalid("bitmap payload length mismatch"));
                    }
                    let mut words = Box::new([0u64; BITMAP_LENGTH]);
                    for word in words.iter_mut() {
                        *word = reader.read_u64::<LittleEndian>()?;
                    }
                    let len = words.iter().map(|w| w.count_ones() as u64).sum();
                    let bitmap = BitmapStore::try_from(len, words)
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                    Store::Bitmap(bitmap)
                }
                TYPECODE_RUN => {
                    let n_runs = reader.read_u32::<LittleEndian>()? as usize;
                    if 4 + n_runs * 4 != declared_payload_len as usize {
                        return Err(invalid("run payload length mismatch"));
                    }
                    let mut runs = Vec::with_capacity(n_runs);
                    let mut prev_end: Option<u16> = None;
                    for _ in 0..n_runs {
                        let start = reader.read_u16::<LittleEndian>()?;
                        let length_minus_one = reader.read_u16::<LittleEndian>()?;
                        let end = start
                            .checked_add(length_minus_one)
                            .ok_or_else(|| invalid("run end overflows u16"))?;
                        if let Some(prev_end) = prev_end {
                            if start as i32 <= prev_end as i32 + 1 {
                                return Err(invalid("runs are not ascending and non-adjacent"));
                            }
                        }
                        prev_end = Some(end);
                        runs.push(RunInterval::new(start, end));
                    }
                    Store::Run(RunStore::from_runs_unchecked(runs))
                }
                _ => return Err(invalid("unknown typecode")),
            };

            containers.push(Container { key: keys[i], store });
        }

        let bitmap = RoaringBitmap { containers };
        if bitmap.serialized_size() as u32 != total_len {
            return Err(invalid("declared total length does not match contents"));
        }

        Ok(bitmap)
    }
}
