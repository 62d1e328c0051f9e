//! Checksum adapter and algorithm catalog
//!
//! The catalog is plain data: a name plus the parameters of the algorithm.
//! A provider is built from an entry once per run and shared by every
//! worker, so CRC lookup tables are computed once and reused for every
//! sample.

use std::sync::Arc;

use crc::{Algorithm, Crc};

use crate::crc_error::{AnalysisError, AnalysisResult};
use crate::crc_interface::{ChecksumProvider, Message};

// ============================================================================
// Catalog data
// ============================================================================

/// Word width an XOR checksum folds the byte stream into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XorWidth {
    W8,
    W16,
    W32,
}

impl XorWidth {
    pub fn bits(self) -> u32 {
        match self {
            XorWidth::W8 => 8,
            XorWidth::W16 => 16,
            XorWidth::W32 => 32,
        }
    }
}

/// Parameters of one catalog algorithm
#[derive(Clone, Copy)]
pub enum AlgorithmSpec {
    Crc8(&'static Algorithm<u8>),
    Crc16(&'static Algorithm<u16>),
    Crc32(&'static Algorithm<u32>),
    Crc64(&'static Algorithm<u64>),
    Xor { width: XorWidth, mask: u64 },
}

impl AlgorithmSpec {
    pub fn width(&self) -> u32 {
        match self {
            AlgorithmSpec::Crc8(alg) => alg.width as u32,
            AlgorithmSpec::Crc16(alg) => alg.width as u32,
            AlgorithmSpec::Crc32(alg) => alg.width as u32,
            AlgorithmSpec::Crc64(alg) => alg.width as u32,
            AlgorithmSpec::Xor { width, .. } => width.bits(),
        }
    }

    pub fn is_crc(&self) -> bool {
        !matches!(self, AlgorithmSpec::Xor { .. })
    }
}

#[derive(Clone, Copy)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub spec: AlgorithmSpec,
}

// 5G NR polynomials are not part of the crc catalog
static CRC_6_NR: Algorithm<u8> = Algorithm {
    width: 6,
    poly: 0x21,
    init: 0x00,
    refin: false,
    refout: false,
    xorout: 0x00,
    check: 0x15,
    residue: 0x00,
};

static CRC_11_NR: Algorithm<u16> = Algorithm {
    width: 11,
    poly: 0x621,
    init: 0x000,
    refin: false,
    refout: false,
    xorout: 0x000,
    check: 0x5ca,
    residue: 0x000,
};

static CRC_24_NR_C: Algorithm<u32> = Algorithm {
    width: 24,
    poly: 0xb2b117,
    init: 0x000000,
    refin: false,
    refout: false,
    xorout: 0x000000,
    check: 0xf48279,
    residue: 0x000000,
};

const fn crc8(name: &'static str, alg: &'static Algorithm<u8>) -> CatalogEntry {
    CatalogEntry {
        name,
        spec: AlgorithmSpec::Crc8(alg),
    }
}

const fn crc16(name: &'static str, alg: &'static Algorithm<u16>) -> CatalogEntry {
    CatalogEntry {
        name,
        spec: AlgorithmSpec::Crc16(alg),
    }
}

const fn crc32(name: &'static str, alg: &'static Algorithm<u32>) -> CatalogEntry {
    CatalogEntry {
        name,
        spec: AlgorithmSpec::Crc32(alg),
    }
}

const fn crc64(name: &'static str, alg: &'static Algorithm<u64>) -> CatalogEntry {
    CatalogEntry {
        name,
        spec: AlgorithmSpec::Crc64(alg),
    }
}

const fn xor(name: &'static str, width: XorWidth, mask: u64) -> CatalogEntry {
    CatalogEntry {
        name,
        spec: AlgorithmSpec::Xor { width, mask },
    }
}

static STANDARD_CATALOG: &[CatalogEntry] = &[
    crc8("crc4_itu", &crc::CRC_4_G_704),
    crc8("crc5_epc", &crc::CRC_5_EPC_C1G2),
    crc8("crc5_itu", &crc::CRC_5_G_704),
    crc8("crc5_usb", &crc::CRC_5_USB),
    crc8("crc6_cdma2000a", &crc::CRC_6_CDMA2000_A),
    crc8("crc6_cdma2000b", &crc::CRC_6_CDMA2000_B),
    crc8("crc6_itu", &crc::CRC_6_G_704),
    crc8("crc6_nr", &CRC_6_NR),
    crc8("crc7", &crc::CRC_7_MMC),
    crc8("crc8", &crc::CRC_8_SMBUS),
    crc8("crc8_ebu", &crc::CRC_8_TECH_3250),
    crc8("crc8_maxim", &crc::CRC_8_MAXIM_DOW),
    crc8("crc8_wcdma", &crc::CRC_8_WCDMA),
    crc8("crc8_lte", &crc::CRC_8_LTE),
    crc16("crc10", &crc::CRC_10_ATM),
    crc16("crc10_cdma2000", &crc::CRC_10_CDMA2000),
    crc16("crc11", &crc::CRC_11_FLEXRAY),
    crc16("crc11_nr", &CRC_11_NR),
    crc16("crc12_cdma2000", &crc::CRC_12_CDMA2000),
    crc16("crc12_dect", &crc::CRC_12_DECT),
    crc16("crc12_umts", &crc::CRC_12_UMTS),
    crc16("crc13_bbc", &crc::CRC_13_BBC),
    crc16("crc15", &crc::CRC_15_CAN),
    crc16("crc15_mpt1327", &crc::CRC_15_MPT1327),
    crc16("crc16_arc", &crc::CRC_16_ARC),
    crc16("crc16_buypass", &crc::CRC_16_UMTS),
    crc16("crc16_mcrf4xx", &crc::CRC_16_MCRF4XX),
    crc16("crc16_ccittfalse", &crc::CRC_16_IBM_3740),
    crc16("crc16_cdma2000", &crc::CRC_16_CDMA2000),
    crc16("crc16_cms", &crc::CRC_16_CMS),
    crc16("crc16_dectr", &crc::CRC_16_DECT_R),
    crc16("crc16_dectx", &crc::CRC_16_DECT_X),
    crc16("crc16_dnp", &crc::CRC_16_DNP),
    crc16("crc16_genibus", &crc::CRC_16_GENIBUS),
    crc16("crc16_kermit", &crc::CRC_16_KERMIT),
    crc16("crc16_maxim", &crc::CRC_16_MAXIM_DOW),
    crc16("crc16_modbus", &crc::CRC_16_MODBUS),
    crc16("crc16_t10dif", &crc::CRC_16_T10_DIF),
    crc16("crc16_usb", &crc::CRC_16_USB),
    crc16("crc16_x25", &crc::CRC_16_IBM_SDLC),
    crc16("crc16_xmodem", &crc::CRC_16_XMODEM),
    crc32("crc17_can", &crc::CRC_17_CAN_FD),
    crc32("crc21_can", &crc::CRC_21_CAN_FD),
    crc32("crc24", &crc::CRC_24_OPENPGP),
    crc32("crc24_flexraya", &crc::CRC_24_FLEXRAY_A),
    crc32("crc24_flexrayb", &crc::CRC_24_FLEXRAY_B),
    crc32("crc24_ltea", &crc::CRC_24_LTE_A),
    crc32("crc24_lteb", &crc::CRC_24_LTE_B),
    crc32("crc24_nrc", &CRC_24_NR_C),
    crc32("crc30", &crc::CRC_30_CDMA),
    crc32("crc32", &crc::CRC_32_ISO_HDLC),
    crc32("crc32_bzip2", &crc::CRC_32_BZIP2),
    crc32("crc32_c", &crc::CRC_32_ISCSI),
    crc32("crc32_mpeg2", &crc::CRC_32_MPEG_2),
    crc32("crc32_posix", &crc::CRC_32_CKSUM),
    crc32("crc32_q", &crc::CRC_32_AIXM),
    crc64("crc40_gsm", &crc::CRC_40_GSM),
    crc64("crc64", &crc::CRC_64_ECMA_182),
    xor("xor8", XorWidth::W8, 0xFF),
    xor("xor16", XorWidth::W16, 0xFFFF),
    xor("xor32", XorWidth::W32, 0xFFFF_FFFF),
    xor("xor8_masked", XorWidth::W8, 0x7F),
];

// ============================================================================
// Providers
// ============================================================================

enum CrcEngine {
    W8(Crc<u8>),
    W16(Crc<u16>),
    W32(Crc<u32>),
    W64(Crc<u64>),
}

/// Table-driven CRC. The table is built in the constructor.
pub struct CrcChecksum {
    name: String,
    width: u32,
    engine: CrcEngine,
}

impl CrcChecksum {
    fn new(name: &str, spec: AlgorithmSpec) -> Option<Self> {
        let engine = match spec {
            AlgorithmSpec::Crc8(alg) => CrcEngine::W8(Crc::<u8>::new(alg)),
            AlgorithmSpec::Crc16(alg) => CrcEngine::W16(Crc::<u16>::new(alg)),
            AlgorithmSpec::Crc32(alg) => CrcEngine::W32(Crc::<u32>::new(alg)),
            AlgorithmSpec::Crc64(alg) => CrcEngine::W64(Crc::<u64>::new(alg)),
            AlgorithmSpec::Xor { .. } => return None,
        };

        Some(Self {
            name: name.to_string(),
            width: spec.width(),
            engine,
        })
    }
}

impl ChecksumProvider for CrcChecksum {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn checksum(&self, bytes: &[u8]) -> u64 {
        match &self.engine {
            CrcEngine::W8(crc) => crc.checksum(bytes) as u64,
            CrcEngine::W16(crc) => crc.checksum(bytes) as u64,
            CrcEngine::W32(crc) => crc.checksum(bytes) as u64,
            CrcEngine::W64(crc) => crc.checksum(bytes),
        }
    }
}

/// Running XOR of the byte stream read as little-endian words, then masked.
/// A trailing partial word is ignored.
pub struct XorChecksum {
    name: String,
    width: XorWidth,
    mask: u64,
}

impl XorChecksum {
    pub fn new(name: &str, width: XorWidth, mask: u64) -> Self {
        Self {
            name: name.to_string(),
            width,
            mask,
        }
    }
}

impl ChecksumProvider for XorChecksum {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> u32 {
        self.width.bits()
    }

    #[inline]
    fn checksum(&self, bytes: &[u8]) -> u64 {
        let folded = match self.width {
            XorWidth::W8 => bytes.iter().fold(0u8, |acc, b| acc ^ b) as u64,
            XorWidth::W16 => bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .fold(0u16, |acc, w| acc ^ w) as u64,
            XorWidth::W32 => bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .fold(0u32, |acc, w| acc ^ w) as u64,
        };
        folded & self.mask
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Closed set of algorithms selectable by name
pub struct AlgorithmCatalog {
    entries: &'static [CatalogEntry],
}

impl AlgorithmCatalog {
    /// CRC variants of widths 4 to 64 plus the XOR checksums
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_CATALOG,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        self.entries
    }

    /// All algorithm names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.iter().map(|e| e.name).collect();
        names.sort_unstable();
        names
    }

    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Build the shared provider for `name`
    pub fn provider(&self, name: &str) -> AnalysisResult<Arc<dyn ChecksumProvider>> {
        let entry = self
            .entry(name)
            .ok_or_else(|| AnalysisError::UnknownAlgorithm(name.to_string()))?;

        let provider: Arc<dyn ChecksumProvider> = match entry.spec {
            AlgorithmSpec::Xor { width, mask } => {
                Arc::new(XorChecksum::new(entry.name, width, mask))
            }
            spec => match CrcChecksum::new(entry.name, spec) {
                Some(crc) => Arc::new(crc),
                None => return Err(AnalysisError::UnknownAlgorithm(name.to_string())),
            },
        };
        Ok(provider)
    }
}

impl Default for AlgorithmCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Checksum of a message's raw bytes. `scratch` is reused between calls.
#[inline]
pub fn checksum_message(
    provider: &dyn ChecksumProvider,
    message: &Message,
    scratch: &mut Vec<u8>,
) -> u64 {
    message.write_bytes(scratch);
    provider.checksum(scratch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECK_INPUT: &[u8] = b"123456789";

    fn expected_check(spec: &AlgorithmSpec) -> Option<u64> {
        match spec {
            AlgorithmSpec::Crc8(alg) => Some(alg.check as u64),
            AlgorithmSpec::Crc16(alg) => Some(alg.check as u64),
            AlgorithmSpec::Crc32(alg) => Some(alg.check as u64),
            AlgorithmSpec::Crc64(alg) => Some(alg.check),
            AlgorithmSpec::Xor { .. } => None,
        }
    }

    #[test]
    fn test_catalog_contents() {
        let catalog = AlgorithmCatalog::standard();
        assert_eq!(catalog.len(), 62);
        assert_eq!(catalog.entries().iter().filter(|e| e.spec.is_crc()).count(), 58);

        let names = catalog.names();
        let mut dedup = names.clone();
        dedup.dedup();
        assert_eq!(names.len(), dedup.len(), "duplicate algorithm names");

        for entry in catalog.entries() {
            let width = entry.spec.width();
            assert!((4..=64).contains(&width), "{} width {}", entry.name, width);
        }
    }

    #[test]
    fn test_every_crc_matches_its_check_value() {
        let catalog = AlgorithmCatalog::standard();

        for entry in catalog.entries() {
            if let Some(check) = expected_check(&entry.spec) {
                let provider = catalog.provider(entry.name).unwrap();
                assert_eq!(provider.checksum(CHECK_INPUT), check, "{}", entry.name);
            }
        }
    }

    #[test]
    fn test_well_known_values() {
        let catalog = AlgorithmCatalog::standard();
        assert_eq!(catalog.provider("crc32").unwrap().checksum(CHECK_INPUT), 0xCBF4_3926);
        assert_eq!(catalog.provider("crc8").unwrap().checksum(CHECK_INPUT), 0xF4);
        assert_eq!(
            catalog.provider("crc64").unwrap().checksum(CHECK_INPUT),
            0x6C40_DF5F_0B49_7347
        );
    }

    #[test]
    fn test_unknown_algorithm() {
        let catalog = AlgorithmCatalog::standard();
        assert!(!catalog.contains("crc99"));
        match catalog.provider("crc99") {
            Err(AnalysisError::UnknownAlgorithm(name)) => assert_eq!(name, "crc99"),
            _ => panic!("expected UnknownAlgorithm"),
        }
    }

    #[test]
    fn test_xor_checksums() {
        let catalog = AlgorithmCatalog::standard();
        let bytes = [0x01, 0x02, 0x04, 0x88];

        assert_eq!(catalog.provider("xor8").unwrap().checksum(&bytes), 0x8F);
        assert_eq!(catalog.provider("xor8_masked").unwrap().checksum(&bytes), 0x0F);
        // 0x0201 ^ 0x8804
        assert_eq!(catalog.provider("xor16").unwrap().checksum(&bytes), 0x8A05);
        assert_eq!(catalog.provider("xor32").unwrap().checksum(&bytes), 0x8804_0201);
        assert_eq!(catalog.provider("xor32").unwrap().checksum(&[]), 0);
    }

    #[test]
    fn test_checksum_is_pure() {
        let catalog = AlgorithmCatalog::standard();
        let message = Message::from_words(vec![0xDEAD_BEEF, 0x0BAD_F00D, 7]);
        let mut scratch = Vec::new();

        for name in ["crc16_x25", "crc32_c", "xor16"] {
            let provider = catalog.provider(name).unwrap();
            let first = checksum_message(provider.as_ref(), &message, &mut scratch);
            let second = checksum_message(provider.as_ref(), &message, &mut scratch);
            assert_eq!(first, second, "{}", name);
        }
    }

    #[test]
    fn test_checksum_fits_width() {
        let catalog = AlgorithmCatalog::standard();
        let message = Message::from_words(vec![u32::MAX; 4]);
        let mut scratch = Vec::new();

        for entry in catalog.entries() {
            let provider = catalog.provider(entry.name).unwrap();
            let value = checksum_message(provider.as_ref(), &message, &mut scratch);
            if provider.width() < 64 {
                assert!(value < (1u64 << provider.width()), "{}", entry.name);
            }
        }
    }
}
