/*!
 * types
 *
 * 役割:
 *   - 起動シーケンス全体で共有する素朴な型・定数を集約する。
 *
 * やること:
 *   - 32-bit アドレス / ワード型、ワード幅、メモリ領域 (top, limit) の表現。
 *
 * やらないこと:
 *   - レジスタアクセスやメモリ書き込みなどの arch 依存処理。
 *
 * 設計方針:
 *   - ARMv7-M は MMU を持たないので、物理/仮想の区別はしない。
 *   - アドレスは常に u32。ホスト上のテストでも同じ幅で扱う。
 */

/// バス上のバイトアドレス（ARMv7-M の 32-bit 物理アドレス）
pub type Addr = u32;

/// バス上の 1 ワード
pub type Word = u32;

/// 1 ワードのバイト数
pub const WORD_SIZE: u32 = 4;

/// `index` 番目のワードのアドレスを返す。
#[inline(always)]
pub const fn word_addr(base: Addr, index: u32) -> Addr {
    base + index * WORD_SIZE
}

/// カーネル内アロケータに引き渡すメモリ領域。
///
/// - top: 先頭（低アドレス側）
/// - limit: 終端（高アドレス側、この番地は含まない）
///
/// top <= limit は構成側の不変条件であり、ここでは検査しない。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryRegion {
    pub top: Addr,
    pub limit: Addr,
}

impl MemoryRegion {
    pub const fn new(top: Addr, limit: Addr) -> Self {
        MemoryRegion { top, limit }
    }

    pub fn size_bytes(&self) -> u32 {
        self.limit.saturating_sub(self.top)
    }
}
