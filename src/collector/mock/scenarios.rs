//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc/slabinfo` states for testing
//! collector passes under various conditions.

use super::filesystem::MockFs;

/// Default location of slabinfo inside the mock filesystem.
pub const SLABINFO_PATH: &str = "/proc/slabinfo";

/// Banner and header lines as printed by a 2.1 kernel.
pub const SLABINFO_HEADER: &str = "\
slabinfo - version: 2.1
# name            <active_objs> <num_objs> <objsize> <objperslab> <pagesperslab> : tunables <limit> <batchcount> <sharedfactor> : slabdata <active_slabs> <num_slabs> <sharedavail>
";

/// A small but realistic slabinfo table.
pub const TYPICAL_SLABINFO: &str = "\
slabinfo - version: 2.1
# name            <active_objs> <num_objs> <objsize> <objperslab> <pagesperslab> : tunables <limit> <batchcount> <sharedfactor> : slabdata <active_slabs> <num_slabs> <sharedavail>
ext4_inode_cache   41230  41580   1080   30    8 : tunables    0    0    0 : slabdata   1386   1386      0
nf_conntrack         612    714    320   51    4 : tunables    0    0    0 : slabdata     14     14      0
dentry            102357 104853    192   21    1 : tunables    0    0    0 : slabdata   4993   4993      0
kmalloc-64         38912  39104     64   64    1 : tunables  120   60    8 : slabdata    611    611      0
kmalloc-rcl-8k         0      0   8192    4    8 : tunables    0    0    0 : slabdata      0      0      0
dma-kmalloc-512        0      0    512   32    4 : tunables    0    0    0 : slabdata      0      0      0
";

impl MockFs {
    /// Creates a system with a typical slabinfo table.
    ///
    /// Includes six pools: ext4 inodes, conntrack, dentries and three
    /// kmalloc size classes (two of them unused).
    pub fn typical_slabinfo() -> Self {
        let mut fs = Self::new();
        fs.add_file(SLABINFO_PATH, TYPICAL_SLABINFO);
        fs
    }

    /// Creates a system whose slabinfo only has the banner and header.
    pub fn empty_slabinfo() -> Self {
        let mut fs = Self::new();
        fs.add_file(SLABINFO_PATH, SLABINFO_HEADER);
        fs
    }

    /// Creates a system whose slabinfo mixes valid rows with rows that
    /// fail to parse: a short row, a row with a non-numeric field and a row
    /// whose value overflows `i64`.
    pub fn slabinfo_with_bad_rows() -> Self {
        let mut fs = Self::new();
        fs.add_file(
            SLABINFO_PATH,
            format!(
                "{}{}{}{}{}",
                SLABINFO_HEADER,
                "dentry 100 200 192 21 1 : tunables 0 0 0 : slabdata 10 10 0\n",
                "truncated 1 2 3 : tunables 0 0 0\n",
                "bogus 1 two 3 4 5 : tunables 0 0 0 : slabdata 1 1 0\n",
                "huge 99999999999999999999 1 1 1 1 : tunables 0 0 0 : slabdata 1 1 0\n",
            ),
        );
        fs
    }

    /// Creates a system with the same pool name listed twice.
    pub fn slabinfo_with_duplicates() -> Self {
        let mut fs = Self::new();
        fs.add_file(
            SLABINFO_PATH,
            format!(
                "{}{}{}",
                SLABINFO_HEADER,
                "kmalloc-32 10 20 32 128 1 : tunables 0 0 0 : slabdata 1 1 0\n",
                "kmalloc.32 30 40 32 128 1 : tunables 0 0 0 : slabdata 2 2 0\n",
            ),
        );
        fs
    }

    /// Creates a system whose slabinfo read fails after two data rows.
    pub fn slabinfo_read_error() -> Self {
        let mut fs = Self::new();
        fs.add_file_with_read_error(
            SLABINFO_PATH,
            format!(
                "{}{}{}",
                SLABINFO_HEADER,
                "dentry 100 200 192 21 1 : tunables 0 0 0 : slabdata 10 10 0\n",
                "kmalloc-64 120 128 64 64 1 : tunables 0 0 0 : slabdata 2 2 0\n",
            ),
            "input/output error",
        );
        fs
    }

    /// Creates a system where slabinfo exists but cannot be opened, as for
    /// an unprivileged user on most distributions.
    pub fn slabinfo_permission_denied() -> Self {
        let mut fs = Self::new();
        fs.deny(SLABINFO_PATH);
        fs
    }
}
