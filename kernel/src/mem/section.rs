// kernel/src/mem/section.rs
//
// 役割:
// - リンカが生成する copy table / zero table に従って、初期値付き・ゼロ初期化の static 領域を作る。
//
// やること:
// - copy table の各エントリについて src -> dest へ wlen ワードをコピー
// - その後、zero table の各エントリについて dest から wlen ワードを 0 で埋める
//
// やらないこと:
// - 領域の重なり検出（重ならないことはリンカスクリプト側の前提）
// - static の読み書き（この処理が終わるまで static は未初期化なので触らない）
//
// 重要:
// - copy を全部終えてから zero に進む（順序は固定）
// - ここは Interrupt Gate の直後、ボード初期化より前に呼ばれる

use crate::arch::bus::WordBus;
use crate::types::{word_addr, Addr};

/// 1 ブロック分のコピー指示（リンカ生成、3 ワード）
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyDescriptor {
    pub src: Addr,
    pub dest: Addr,
    pub wlen: u32,
}

/// 1 ブロック分のゼロ埋め指示（リンカ生成、2 ワード）
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZeroDescriptor {
    pub dest: Addr,
    pub wlen: u32,
}

/// copy table と zero table の組
#[derive(Clone, Copy, Debug)]
pub struct SectionTables<'a> {
    pub copy: &'a [CopyDescriptor],
    pub zero: &'a [ZeroDescriptor],
}

impl<'a> SectionTables<'a> {
    pub const fn new(copy: &'a [CopyDescriptor], zero: &'a [ZeroDescriptor]) -> Self {
        SectionTables { copy, zero }
    }

    /// 開始/終了マーカーの間にある表をスライスとして見る。
    ///
    /// # Safety
    /// - `start..end` はリンカが出力した表そのものであること（同じ配列内、end >= start）。
    /// - 表はフラッシュ上にあり、起動シーケンスの間は書き換えられないこと。
    pub unsafe fn from_markers(
        copy_start: *const CopyDescriptor,
        copy_end: *const CopyDescriptor,
        zero_start: *const ZeroDescriptor,
        zero_end: *const ZeroDescriptor,
    ) -> Self {
        // Safety: 呼び出し側の前提（同一配列内のマーカー）にそのまま依存する
        unsafe {
            SectionTables {
                copy: table_between(copy_start, copy_end),
                zero: table_between(zero_start, zero_end),
            }
        }
    }
}

unsafe fn table_between<'a, T>(start: *const T, end: *const T) -> &'a [T] {
    let len = (end as usize - start as usize) / core::mem::size_of::<T>();
    // Safety: from_markers の前提
    unsafe { core::slice::from_raw_parts(start, len) }
}

/// copy table をすべて処理する。
pub fn copy_sections<B: WordBus + ?Sized>(bus: &mut B, table: &[CopyDescriptor]) {
    for d in table {
        for i in 0..d.wlen {
            let w = bus.read_word(word_addr(d.src, i));
            bus.write_word(word_addr(d.dest, i), w);
        }
    }
}

/// zero table をすべて処理する。
pub fn zero_sections<B: WordBus + ?Sized>(bus: &mut B, table: &[ZeroDescriptor]) {
    for d in table {
        for i in 0..d.wlen {
            bus.write_word(word_addr(d.dest, i), 0);
        }
    }
}

/// copy -> zero の順に static 領域を作る。
pub fn init_sections<B: WordBus + ?Sized>(bus: &mut B, tables: &SectionTables<'_>) {
    copy_sections(bus, tables.copy);
    zero_sections(bus, tables.zero);
}
