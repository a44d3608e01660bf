// kernel/src/boot/entry.rs
//
// 実機の入口 glue
//
// 役割:
// - リセットハンドラ（アセンブリ側）から呼ばれる `start_kernel` を提供する
// - リンカシンボル / ボード関数 / カーネル入口を BootPlan と BootHw に詰めて run に渡す
//
// やらないこと:
// - 起動シーケンスの中身（boot::prepare の責務）
//
// 重要:
// - ここでは static を読まない。BOOT_STATE は参照を渡すだけで、触るのは section 初期化の後。

use core::ptr::addr_of;

use crate::arch::bus::VolatileBus;
use crate::arch::cpu::CortexM;
use crate::arch::vector::RUNTIME_VECTOR_TABLE;
use crate::config::VECTOR_COUNT;
use crate::mem::region::SystemMemory;
use crate::mem::section::{CopyDescriptor, SectionTables, ZeroDescriptor};
use crate::types::Addr;

use super::state::{BootToken, BOOT_STATE};
use super::{run, Board, BootHw, BootPlan};

extern "C" {
    static __copy_table_start__: CopyDescriptor;
    static __copy_table_end__: CopyDescriptor;
    static __zero_table_start__: ZeroDescriptor;
    static __zero_table_end__: ZeroDescriptor;

    /// 静的イメージ (.data/.bss) の終端
    #[link_name = "end"]
    static IMAGE_END: u8;

    fn board_startup_hw();
    fn board_sysclk_hz() -> u32;
    fn kernel_main();
}

/// ボード側の C ABI 関数をそのまま呼ぶ
struct ExternBoard;

impl Board for ExternBoard {
    fn startup_hw(&mut self) {
        // Safety: ボード側の入口。割込みマスク中に 1 回だけ呼ぶ
        unsafe { board_startup_hw() }
    }

    fn sysclk_hz(&mut self) -> u32 {
        // Safety: startup_hw の後であれば読むだけ
        unsafe { board_sysclk_hz() }
    }
}

fn system_memory() -> SystemMemory {
    #[cfg(feature = "static_sys_mem")]
    {
        use crate::mem::region::SYSTEM_MEM;
        SystemMemory::Static {
            base: SYSTEM_MEM.as_ptr() as Addr,
            size: crate::config::SYSTEM_MEM_SIZE,
        }
    }
    #[cfg(not(feature = "static_sys_mem"))]
    {
        SystemMemory::Computed(crate::config::MEMORY_LAYOUT)
    }
}

/// リセットハンドラから呼ばれる起動シーケンスの入口（戻らない）
///
/// # Safety
/// - リセット後に 1 回だけ、スタックが有効な状態で呼ぶこと。
#[no_mangle]
pub unsafe extern "C" fn start_kernel() -> ! {
    // Safety: リセット後 1 回だけ呼ばれる入口
    let (token, bus, cpu) = unsafe { (BootToken::steal(), VolatileBus::new(), CortexM::new()) };

    // Safety: リンカが出力した表の先頭と終端
    let sections = unsafe {
        SectionTables::from_markers(
            addr_of!(__copy_table_start__),
            addr_of!(__copy_table_end__),
            addr_of!(__zero_table_start__),
            addr_of!(__zero_table_end__),
        )
    };

    let plan = BootPlan {
        sections,
        runtime_vector_table: RUNTIME_VECTOR_TABLE.as_ptr() as Addr,
        vector_count: VECTOR_COUNT,
        system_memory: system_memory(),
        // Safety: 番地を取るだけで読まない
        image_end: unsafe { addr_of!(IMAGE_END) } as Addr,
    };

    let hw = BootHw {
        bus,
        cpu,
        board: ExternBoard,
    };

    // Safety: kernel_main はカーネル本体の入口
    unsafe { run(token, hw, &plan, &BOOT_STATE, kernel_main) }
}
